//! Maps `CvData` onto the visual tree.
//!
//! Each section builder returns `Ok(None)` when its list is absent or empty and
//! `Err(SectionError::MissingField)` when an entry lacks a field the section cannot do
//! without. Either way the section is left out and the rest of the page renders.

use thiserror::Error;
use tracing::warn;

use crate::document::model::{
    Award, CvData, Education, Experience, Footer, IconLink, Project, SkillGroup, SpokenLanguage,
};
use crate::locale::{Labels, Locale};
use crate::render::tree::Element;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("{section} entry {index} has no `{field}`, section omitted")]
    MissingField {
        section: &'static str,
        index: usize,
        field: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Education,
    Experience,
    Awards,
    Projects,
    Skills,
    Languages,
}

impl SectionKind {
    /// Label key, also the CSS suffix (`section-education`).
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Education => "education",
            SectionKind::Experience => "experience",
            SectionKind::Awards => "awards",
            SectionKind::Projects => "projects",
            SectionKind::Skills => "skills",
            SectionKind::Languages => "languages",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SectionKind::Education => "fas fa-graduation-cap",
            SectionKind::Experience => "fas fa-briefcase",
            SectionKind::Awards => "fas fa-award",
            SectionKind::Projects => "fas fa-project-diagram",
            SectionKind::Skills => "fas fa-cogs",
            SectionKind::Languages => "fas fa-language",
        }
    }
}

/// Section order and target column.
const LAYOUT: [(SectionKind, usize); 6] = [
    (SectionKind::Education, 0),
    (SectionKind::Experience, 0),
    (SectionKind::Awards, 0),
    (SectionKind::Projects, 1),
    (SectionKind::Skills, 1),
    (SectionKind::Languages, 1),
];

/// The `#cv` subtree plus what went into it.
#[derive(Debug, Clone)]
pub struct RenderedCv {
    pub root: Element,
    /// Sections actually rendered, in layout order.
    pub sections: Vec<SectionKind>,
    pub omitted: Vec<SectionError>,
}

type SectionResult = Result<Option<Element>, SectionError>;

/// Builds the whole CV. Labels must already be bound to the selected locale.
pub fn build_cv(data: &CvData, labels: &Labels<'_>) -> RenderedCv {
    let mut root = Element::new("div").attr("id", "cv");
    if let Some(z) = data.zoom_factor() {
        root = root.attr(
            "style",
            format!("zoom: {z}; width: calc(210mm / {z}); height: calc(297mm / {z});"),
        );
    }

    root.push(build_header(data));

    let mut body = Element::new("div").class("cv-body");
    if let Some(columns) = data.grid_template_columns.as_deref() {
        body = body.attr("style", format!("grid-template-columns: {columns};"));
    }

    let mut columns: Vec<(usize, Element)> = Vec::new();
    let mut sections = Vec::new();
    let mut omitted = Vec::new();
    for (kind, column) in LAYOUT {
        let section = match build_section(kind, data, labels) {
            Ok(Some(section)) => section,
            Ok(None) => continue,
            Err(e) => {
                warn!("{e}");
                omitted.push(e);
                continue;
            }
        };
        sections.push(kind);
        match columns.iter_mut().find(|(index, _)| *index == column) {
            Some((_, col)) => col.push(section),
            None => columns.push((column, Element::new("div").class("column").child(section))),
        }
    }
    for (_, column) in columns {
        body.push(column);
    }
    root.push(body);

    if let Some(footer) = data.footer.as_ref().and_then(build_footer) {
        root.push(footer);
    }

    RenderedCv {
        root,
        sections,
        omitted,
    }
}

fn build_section(kind: SectionKind, data: &CvData, labels: &Labels<'_>) -> SectionResult {
    match kind {
        SectionKind::Education => education(data.education.as_deref(), labels),
        SectionKind::Experience => experience(data.experience.as_deref(), labels),
        SectionKind::Awards => awards(data.awards.as_deref(), labels),
        SectionKind::Projects => projects(data.projects.as_deref(), labels),
        SectionKind::Skills => skills(data.skills.as_deref(), labels),
        SectionKind::Languages => languages(data.languages.as_deref(), labels),
    }
}

// ──────────────────────────────────────────────
// Header
// ──────────────────────────────────────────────

fn build_header(data: &CvData) -> Element {
    let mut right = Element::new("div")
        .class("right")
        .child(Element::new("h1").text(data.name.clone().unwrap_or_default()));
    if let Some(bio) = data.bio.as_deref() {
        for line in bio.split('\n') {
            right.push(Element::new("p").class("bio").text(line));
        }
    }

    let mut photo_and_name = Element::new("div").class("photo-and-name");
    if let Some(picture) = data.profile_picture.as_deref() {
        photo_and_name.push(
            Element::new("img")
                .attr("src", picture)
                .attr("alt", "Profile photo"),
        );
    }
    photo_and_name.push(right);

    let contact_and_links = Element::new("div")
        .class("contact-and-links")
        .child(icon_list(data.links.as_deref(), "links", false))
        .child(icon_list(data.contact.as_deref(), "contact", true));

    let mut header = Element::new("header")
        .class("cv-header")
        .child(photo_and_name)
        .child(contact_and_links);
    if let Some(text) = data.text.as_deref() {
        header.push(Element::new("p").class("summary").text(text));
    }
    header
}

/// `<address>` of anchors; the icon goes before the label, or after it when `icon_after`.
fn icon_list(items: Option<&[IconLink]>, class: &str, icon_after: bool) -> Element {
    let mut list = Element::new("address").class(class);
    for item in items.unwrap_or_default() {
        let mut icon = Element::new("i");
        if let Some(classes) = item.icon.as_deref() {
            icon = icon.class(classes);
        }
        let icon = icon.class("icon");
        let label = item.label.clone().unwrap_or_default();
        let line = if icon_after {
            Element::new("p").text(label).child(icon)
        } else {
            Element::new("p").child(icon).text(label)
        };

        let mut anchor = Element::new("a");
        if let Some(name) = item.name.as_deref() {
            anchor = anchor.attr("title", name);
        }
        if let Some(url) = item.url.as_deref() {
            anchor = anchor.attr("href", url);
        }
        list.push(anchor.attr("target", "_blank").child(line));
    }
    list
}

// ──────────────────────────────────────────────
// Sections
// ──────────────────────────────────────────────

fn section_shell(kind: SectionKind, labels: &Labels<'_>) -> Element {
    Element::new("section")
        .class("section")
        .class(&format!("section-{}", kind.key()))
        .child(
            Element::new("h2")
                .child(Element::new("i").class(kind.icon()).class("icon"))
                .text(labels.t(kind.key())),
        )
}

/// Anchor that only links somewhere when `link` is set.
fn link_wrapper(link: Option<&str>) -> Element {
    match link.filter(|l| !l.is_empty()) {
        Some(href) => Element::new("a").attr("href", href).attr("target", "_blank"),
        None => Element::new("a"),
    }
}

fn title_elem(heading: &str, date: Option<&str>, date_class: &str) -> Element {
    let mut title = Element::new("div")
        .class("title-elem")
        .child(Element::new("h3").text(heading));
    if let Some(date) = date {
        title.push(Element::new("p").class(date_class).text(date));
    }
    title
}

fn required<'a>(
    value: &'a Option<String>,
    section: &'static str,
    index: usize,
    field: &'static str,
) -> Result<&'a str, SectionError> {
    value.as_deref().ok_or(SectionError::MissingField {
        section,
        index,
        field,
    })
}

fn non_empty<T>(items: Option<&[T]>) -> Option<&[T]> {
    items.filter(|items| !items.is_empty())
}

/// `fr`: `Degree (Mention "X")`; otherwise `Degree - X`.
fn degree_text(degree: &str, mention: Option<&str>, locale: Locale) -> String {
    match (mention.filter(|m| !m.is_empty()), locale) {
        (None, _) => degree.to_string(),
        (Some(m), Locale::Fr) => format!("{degree} (Mention \"{m}\")"),
        (Some(m), _) => format!("{degree} - {m}"),
    }
}

fn education(items: Option<&[Education]>, labels: &Labels<'_>) -> SectionResult {
    let Some(items) = non_empty(items) else {
        return Ok(None);
    };
    let kind = SectionKind::Education;
    let mut section = section_shell(kind, labels);

    for (index, item) in items.iter().enumerate() {
        let institution = required(&item.institution, kind.key(), index, "institution")?;
        let mut link = link_wrapper(item.link.as_deref())
            .child(title_elem(institution, item.years.as_deref(), "date"));

        if let Some(degree) = item.degree.as_deref() {
            link.push(
                Element::new("p")
                    .class("education-degree")
                    .text(degree_text(degree, item.mention.as_deref(), labels.locale())),
            );
        }
        if let Some(specialization) = item.specialization.as_deref() {
            link.push(
                Element::new("p")
                    .class("education-specialization")
                    .text(specialization),
            );
        }
        if let Some(skills) = item.skills.as_deref() {
            let list = match skills {
                [single] => Element::new("p").text(single.as_str()),
                many => {
                    let mut ul = Element::new("ul");
                    for (i, skill) in many.iter().enumerate() {
                        let text = if i + 1 < many.len() {
                            format!("{skill}, ")
                        } else {
                            skill.clone()
                        };
                        ul.push(Element::new("li").text(text));
                    }
                    ul
                }
            };
            link.push(list.class("education-skills"));
        }

        section.push(
            Element::new("div")
                .class("education-item item")
                .child(link),
        );
    }
    Ok(Some(section))
}

fn experience(items: Option<&[Experience]>, labels: &Labels<'_>) -> SectionResult {
    let Some(items) = non_empty(items) else {
        return Ok(None);
    };
    let kind = SectionKind::Experience;
    let mut section = section_shell(kind, labels);

    for (index, item) in items.iter().enumerate() {
        let company = required(&item.company, kind.key(), index, "company")?;
        let position = required(&item.position, kind.key(), index, "position")?;
        let mut link = link_wrapper(item.link.as_deref())
            .child(title_elem(company, item.date.as_deref(), "date"))
            .child(Element::new("p").class("experience-position").text(position));
        if let Some(tasks) = item.tasks.as_deref() {
            link.push(
                Element::new("p")
                    .class("experience-tasks")
                    .text(tasks.join(", ")),
            );
        }
        section.push(
            Element::new("div")
                .class("experience-item item")
                .child(link),
        );
    }
    Ok(Some(section))
}

fn skills(items: Option<&[SkillGroup]>, labels: &Labels<'_>) -> SectionResult {
    let Some(items) = non_empty(items) else {
        return Ok(None);
    };
    let kind = SectionKind::Skills;
    let mut section = section_shell(kind, labels);

    for (index, group) in items.iter().enumerate() {
        let title = required(&group.title, kind.key(), index, "title")?;
        let list = group.skill_list.as_deref().ok_or(SectionError::MissingField {
            section: kind.key(),
            index,
            field: "skill_list",
        })?;

        let mut paragraph = Element::new("p");
        for (i, skill) in list.iter().enumerate() {
            let name = required(&skill.name, kind.key(), index, "skill_list.name")?;
            let text = if i + 1 < list.len() {
                format!("{name}, ")
            } else {
                name.to_string()
            };
            paragraph.push(link_wrapper(skill.link.as_deref()).text(text));
        }

        section.push(
            Element::new("div")
                .class("skills-item item")
                .child(title_elem(title, None, "date"))
                .child(paragraph),
        );
    }
    Ok(Some(section))
}

fn projects(items: Option<&[Project]>, labels: &Labels<'_>) -> SectionResult {
    let Some(items) = non_empty(items) else {
        return Ok(None);
    };
    let kind = SectionKind::Projects;
    let mut section = section_shell(kind, labels);

    for (index, item) in items.iter().enumerate() {
        let name = required(&item.name, kind.key(), index, "name")?;
        let mut link = link_wrapper(item.link.as_deref())
            .child(title_elem(name, item.date.as_deref(), "date"));
        if let Some(description) = item.description.as_deref() {
            link.push(Element::new("p").text(description));
        }
        section.push(Element::new("div").class("project-item item").child(link));
    }
    Ok(Some(section))
}

fn awards(items: Option<&[Award]>, labels: &Labels<'_>) -> SectionResult {
    let Some(items) = non_empty(items) else {
        return Ok(None);
    };
    let kind = SectionKind::Awards;
    let mut section = section_shell(kind, labels);

    for (index, item) in items.iter().enumerate() {
        let name = required(&item.name, kind.key(), index, "name")?;
        let mut award = Element::new("div")
            .class("award-item item")
            .child(title_elem(name, item.year.as_deref(), "date"));
        if let Some(achievement) = item.achievement.as_deref() {
            award.push(Element::new("p").text(achievement));
        }
        section.push(link_wrapper(item.link.as_deref()).child(award));
    }
    Ok(Some(section))
}

fn languages(items: Option<&[SpokenLanguage]>, labels: &Labels<'_>) -> SectionResult {
    let Some(items) = non_empty(items) else {
        return Ok(None);
    };
    let kind = SectionKind::Languages;
    let mut section = section_shell(kind, labels);

    for (index, item) in items.iter().enumerate() {
        let name = required(&item.name, kind.key(), index, "name")?;
        let link = link_wrapper(item.link.as_deref()).child(title_elem(
            name,
            item.proficiency.as_deref(),
            "language-proficiency",
        ));
        let mut entry = Element::new("div").class("language-item item").child(link);
        if let Some(certificate) = item.certificate.as_deref() {
            entry.push(
                Element::new("p")
                    .class("language-certificate")
                    .text(certificate),
            );
        }
        section.push(entry);
    }
    Ok(Some(section))
}

// ──────────────────────────────────────────────
// Footer
// ──────────────────────────────────────────────

fn build_footer(footer: &Footer) -> Option<Element> {
    if footer.link.is_none() && footer.image.is_none() && footer.text.is_none() {
        return None;
    }
    let mut link = link_wrapper(footer.link.as_deref());
    if let Some(image) = footer.image.as_deref() {
        link.push(Element::new("img").attr("src", image).attr("alt", "Logo"));
    }
    if let Some(text) = footer.text.as_deref() {
        link.push(Element::new("p").text(text));
    }
    Some(Element::new("footer").class("cv-footer").child(link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::lenient::parse_lenient;
    use crate::locale::Translations;

    const SAMPLE: &str = r#"{
        "meta": {"title": "Backend", "locale": "en"},
        "data": {
            "name": "Ada Lovelace",
            "bio": "Analyst\nMathematician",
            "profile_picture": "sources/img/ada.jpg",
            "links": [{"name": "Site", "label": "ada.dev", "url": "https://ada.dev", "icon": "fas fa-globe"}],
            "contact": [{"name": "Mail", "label": "ada@ada.dev", "url": "mailto:ada@ada.dev", "icon": "fas fa-envelope"}],
            "education": [{
                "institution": "University of London",
                "years": "1830 - 1833",
                "degree": "Mathematics",
                "mention": "Honours",
                "skills": ["Analysis", "Logic"]
            }],
            "experience": [{"company": "Analytical Engine", "date": "1843", "position": "Programmer", "tasks": ["Notes", "Algorithm"]}],
            "skills": [{"title": "Languages", "skill_list": [{"name": "Rust", "link": "https://rust-lang.org"}, {"name": "Go"}]}],
            "projects": [{"name": "Note G", "date": "1843", "description": "Bernoulli numbers"}],
            "languages": [{"name": "French", "proficiency": "C1", "certificate": "DALF"}],
            "footer": {"text": "Made by hand"},
            "grid_template_columns": "2fr 1fr"
        }
    }"#;

    fn render(raw: &str, locale: Locale) -> RenderedCv {
        let doc = parse_lenient(raw).unwrap();
        let translations = Translations::builtin();
        build_cv(&doc.data, &translations.labels(locale))
    }

    #[test]
    fn test_document_without_awards_has_no_awards_section() {
        let cv = render(SAMPLE, Locale::En);
        assert!(!cv.sections.contains(&SectionKind::Awards));
        assert!(cv
            .root
            .find_all(&|e| e.has_class("section-awards"))
            .is_empty());
        assert_eq!(
            cv.sections,
            vec![
                SectionKind::Education,
                SectionKind::Experience,
                SectionKind::Projects,
                SectionKind::Skills,
                SectionKind::Languages,
            ]
        );
    }

    #[test]
    fn test_sections_are_split_into_two_columns() {
        let cv = render(SAMPLE, Locale::En);
        let columns = cv.root.find_all(&|e| e.has_class("column"));
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].child_elements().count(), 2);
        assert_eq!(columns[1].child_elements().count(), 3);

        let body = cv.root.find_all(&|e| e.has_class("cv-body"))[0];
        assert_eq!(body.get_attr("style"), Some("grid-template-columns: 2fr 1fr;"));
    }

    #[test]
    fn test_only_needed_columns_are_created() {
        let cv = render(
            r#"{"data": {"name": "A", "languages": [{"name": "English"}]}}"#,
            Locale::En,
        );
        assert_eq!(cv.root.find_all(&|e| e.has_class("column")).len(), 1);
    }

    #[test]
    fn test_section_titles_use_selected_locale() {
        let fr = render(SAMPLE, Locale::Fr);
        let skills = fr.root.find_all(&|e| e.has_class("section-skills"))[0];
        assert!(skills.text_content().starts_with("Compétences"));
    }

    #[test]
    fn test_degree_text_depends_on_locale() {
        let en = render(SAMPLE, Locale::En);
        let degree = en.root.find_all(&|e| e.has_class("education-degree"))[0];
        assert_eq!(degree.text_content(), "Mathematics - Honours");

        let fr = render(SAMPLE, Locale::Fr);
        let degree = fr.root.find_all(&|e| e.has_class("education-degree"))[0];
        assert_eq!(degree.text_content(), "Mathematics (Mention \"Honours\")");
    }

    #[test]
    fn test_list_joining() {
        let cv = render(SAMPLE, Locale::En);
        let items = cv.root.find_all(&|e| e.tag == "li");
        assert_eq!(items[0].text_content(), "Analysis, ");
        assert_eq!(items[1].text_content(), "Logic");

        let tasks = cv.root.find_all(&|e| e.has_class("experience-tasks"))[0];
        assert_eq!(tasks.text_content(), "Notes, Algorithm");

        let skill_links = cv.root.find_all(&|e| e.tag == "a" && e.text_content() == "Rust, ");
        assert_eq!(skill_links[0].get_attr("href"), Some("https://rust-lang.org"));
    }

    #[test]
    fn test_single_education_skill_is_a_paragraph() {
        let cv = render(
            r#"{"data": {"education": [{"institution": "X", "skills": ["Only"]}]}}"#,
            Locale::En,
        );
        let skills = cv.root.find_all(&|e| e.has_class("education-skills"))[0];
        assert_eq!(skills.tag, "p");
        assert_eq!(skills.text_content(), "Only");
    }

    #[test]
    fn test_missing_required_field_omits_only_that_section() {
        let cv = render(
            r#"{"data": {
                "experience": [{"company": "Acme"}],
                "projects": [{"name": "Kept"}]
            }}"#,
            Locale::En,
        );
        assert_eq!(cv.sections, vec![SectionKind::Projects]);
        assert_eq!(
            cv.omitted,
            vec![SectionError::MissingField {
                section: "experience",
                index: 0,
                field: "position",
            }]
        );
    }

    #[test]
    fn test_header_icons_and_bio_lines() {
        let cv = render(SAMPLE, Locale::En);
        assert_eq!(cv.root.find_all(&|e| e.has_class("bio")).len(), 2);

        let links = cv.root.find_all(&|e| e.has_class("links"))[0].to_html();
        assert!(links.contains("<p><i class=\"fas fa-globe icon\"></i>ada.dev</p>"));
        let contact = cv.root.find_all(&|e| e.has_class("contact"))[0].to_html();
        assert!(contact.contains("<p>ada@ada.dev<i class=\"fas fa-envelope icon\"></i></p>"));
    }

    #[test]
    fn test_zoom_compensates_page_box() {
        let cv = render(r#"{"data": {"zoom": "80%"}}"#, Locale::En);
        assert_eq!(
            cv.root.get_attr("style"),
            Some("zoom: 0.8; width: calc(210mm / 0.8); height: calc(297mm / 0.8);")
        );
        let plain = render(r#"{"data": {"zoom": 1}}"#, Locale::En);
        assert_eq!(plain.root.get_attr("style"), None);
    }

    #[test]
    fn test_footer_only_when_present() {
        let cv = render(SAMPLE, Locale::En);
        let footer = cv.root.find_all(&|e| e.has_class("cv-footer"));
        assert_eq!(footer[0].text_content(), "Made by hand");

        let none = render(r#"{"data": {"footer": {}}}"#, Locale::En);
        assert!(none.root.find_all(&|e| e.tag == "footer").is_empty());
    }
}

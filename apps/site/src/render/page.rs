//! Full HTML page around the `#cv` subtree: head, source dropdown, print button and
//! the script that reports fit triggers over the WebSocket.

use crate::document::model::{CvData, Meta};
use crate::locale::Labels;
use crate::render::tree::Element;
use crate::sources::SourceListing;

const FONT_AWESOME: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

const FIT_STYLE: &str = r#"
#cv-container { --cv-scale: 1; overflow: hidden; }
#cv { transform: scale(var(--cv-scale)); transform-origin: top left; }
#cv-error { padding: 2rem; }
@media print {
  .toolbar, #title { display: none; }
  #cv-container { height: auto !important; overflow: visible; }
  #cv { transform: none; }
}
"#;

const PAGE_SCRIPT: &str = r#"
(function () {
  var select = document.getElementById('json-select');
  if (select) select.addEventListener('change', function () {
    if (!select.value) return;
    var url = new URL(window.location.href);
    url.searchParams.set('file', select.value);
    window.location.href = url.href;
  });

  var printBtn = document.getElementById('print-btn');
  if (printBtn && !printBtn.disabled) printBtn.addEventListener('click', function () { window.print(); });

  var container = document.getElementById('cv-container');
  var cv = document.getElementById('cv');
  if (!container || !cv || !window.WebSocket) return;

  var scheme = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
  var socket = new WebSocket(scheme + '//' + window.location.host + '/api/v1/fit/ws');
  var queued = [];

  function measure() {
    var style = getComputedStyle(container);
    return {
      viewport_width: window.innerWidth,
      container_width: container.clientWidth,
      padding_x: (parseFloat(style.paddingLeft) || 0) + (parseFloat(style.paddingRight) || 0),
      padding_y: (parseFloat(style.paddingTop) || 0) + (parseFloat(style.paddingBottom) || 0),
      intrinsic: { width: cv.offsetWidth, height: cv.offsetHeight },
      print: window.matchMedia('print').matches
    };
  }

  function send(trigger, measured) {
    var message = JSON.stringify({ trigger: trigger, measurements: measured ? measure() : null });
    if (socket.readyState === WebSocket.OPEN) socket.send(message); else queued.push(message);
  }

  function reset() {
    container.style.setProperty('--cv-scale', '1');
    container.style.height = 'auto';
  }

  function apply(outcome) {
    if (outcome.kind === 'reset') {
      reset();
    } else if (outcome.kind === 'scaled') {
      container.style.setProperty('--cv-scale', String(outcome.state.factor));
      container.style.height = outcome.container_height + 'px';
    }
  }

  socket.addEventListener('open', function () {
    queued.forEach(function (message) { socket.send(message); });
    queued = [];
  });
  socket.addEventListener('message', function (event) {
    try { apply(JSON.parse(event.data)); } catch (err) { console.error('Bad fit outcome', err); }
  });

  window.addEventListener('resize', function () { send('viewport_resize', true); });
  window.addEventListener('orientationchange', function () { send('orientation_change', true); });
  window.addEventListener('load', function () { send('load', true); });
  window.addEventListener('beforeprint', function () { reset(); send('before_print', false); });
  window.addEventListener('afterprint', function () { send('after_print', true); });
  if (window.visualViewport) {
    window.visualViewport.addEventListener('resize', function () { send('viewport_resize', true); });
  }
  if (window.ResizeObserver) {
    new ResizeObserver(function () { send('container_resize', true); }).observe(container);
  }
})();
"#;

/// Head and toolbar inputs shared by the CV page and the error page.
pub struct PageContext<'a> {
    pub labels: Labels<'a>,
    pub listing: &'a SourceListing,
    pub title: String,
    pub heading: String,
    pub favicon: Option<&'a str>,
}

/// `"{name} - CV {meta.title}"`, trimmed.
pub fn page_title(data: &CvData, meta: &Meta) -> String {
    format!(
        "{} - CV {}",
        data.name.as_deref().unwrap_or_default(),
        meta.title.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string()
}

pub fn page_heading(data: &CvData) -> String {
    format!("{} - CV", data.name.as_deref().unwrap_or_default())
        .trim()
        .to_string()
}

pub fn render_page(ctx: &PageContext<'_>, cv: Element) -> String {
    render_shell(ctx, cv, true)
}

/// Error state: the CV is replaced by a message and printing is disabled.
/// Only the error code is shown; details stay in the server log.
pub fn render_error_page(ctx: &PageContext<'_>, code: &str) -> String {
    let error = Element::new("div")
        .attr("id", "cv-error")
        .class("load-error")
        .child(Element::new("p").text(ctx.labels.t("load_error")))
        .child(Element::new("code").class("error-code").text(code));
    render_shell(ctx, error, false)
}

fn render_shell(ctx: &PageContext<'_>, content: Element, printable: bool) -> String {
    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").text(ctx.title.as_str()));
    if let Some(favicon) = ctx.favicon {
        head.push(
            Element::new("link")
                .attr("id", "favicon")
                .attr("rel", "icon")
                .attr("href", favicon),
        );
    }
    head.push(
        Element::new("link")
            .attr("rel", "stylesheet")
            .attr("href", FONT_AWESOME),
    );
    head.push(
        Element::new("link")
            .attr("rel", "stylesheet")
            .attr("href", "/sources/css/style.css"),
    );
    head.push(Element::new("style").raw(FIT_STYLE));

    let mut print = Element::new("button")
        .attr("id", "print-btn")
        .attr("type", "button")
        .text(ctx.labels.t("print"));
    if !printable {
        print = print.attr("disabled", "disabled");
    }

    let toolbar = Element::new("nav")
        .class("toolbar")
        .child(source_select(ctx))
        .child(print);

    let body = Element::new("body")
        .child(toolbar)
        .child(Element::new("h1").attr("id", "title").text(ctx.heading.as_str()))
        .child(Element::new("main").attr("id", "cv-container").child(content))
        .child(Element::new("script").raw(PAGE_SCRIPT));

    let html = Element::new("html")
        .attr("lang", ctx.labels.locale().code())
        .child(head)
        .child(body);

    let mut out = String::from("<!DOCTYPE html>");
    html.write_html(&mut out);
    out
}

fn source_select(ctx: &PageContext<'_>) -> Element {
    let mut placeholder = Element::new("option")
        .attr("value", "")
        .text(ctx.labels.t("choose_source"));
    if ctx.listing.selected.is_none() {
        placeholder = placeholder.attr("selected", "selected");
    }

    let mut select = Element::new("select")
        .attr("id", "json-select")
        .child(placeholder);
    for (index, entry) in ctx.listing.entries.iter().enumerate() {
        let mut option = Element::new("option")
            .attr("value", entry.abs.as_str())
            .text(entry.label.as_str());
        if ctx.listing.selected == Some(index) {
            option = option.attr("selected", "selected");
        }
        select.push(option);
    }
    select
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{Locale, Translations};
    use crate::sources::listing::SourceEntry;

    fn listing() -> SourceListing {
        SourceListing {
            entries: vec![
                SourceEntry {
                    path: "a.json".to_string(),
                    label: "Backend".to_string(),
                    hidden: false,
                    abs: "http://site.test/sources/cv-data/a.json".to_string(),
                },
                SourceEntry {
                    path: "b.json".to_string(),
                    label: "b.json".to_string(),
                    hidden: false,
                    abs: "http://site.test/sources/cv-data/b.json".to_string(),
                },
            ],
            selected: Some(1),
        }
    }

    #[test]
    fn test_title_and_heading() {
        let data = CvData {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let meta = Meta {
            title: Some("Backend".to_string()),
            ..Default::default()
        };
        assert_eq!(page_title(&data, &meta), "Ada - CV Backend");
        assert_eq!(page_title(&data, &Meta::default()), "Ada - CV");
        assert_eq!(page_heading(&data), "Ada - CV");
    }

    #[test]
    fn test_page_carries_locale_listing_and_cv() {
        let translations = Translations::builtin();
        let listing = listing();
        let ctx = PageContext {
            labels: translations.labels(Locale::En),
            listing: &listing,
            title: "Ada - CV".to_string(),
            heading: "Ada - CV".to_string(),
            favicon: Some("sources/img/ada.jpg"),
        };
        let html = render_page(&ctx, Element::new("div").attr("id", "cv"));

        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\">"));
        assert!(html.contains("<title>Ada - CV</title>"));
        assert!(html.contains("<link id=\"favicon\" rel=\"icon\" href=\"sources/img/ada.jpg\">"));
        assert!(html.contains(
            "<option value=\"http://site.test/sources/cv-data/b.json\" selected=\"selected\">b.json</option>"
        ));
        assert!(html.contains("<div id=\"cv\"></div>"));
        assert!(!html.contains("disabled=\"disabled\""));
    }

    #[test]
    fn test_error_page_disables_print_and_hides_cv() {
        let translations = Translations::builtin();
        let listing = SourceListing {
            entries: Vec::new(),
            selected: None,
        };
        let ctx = PageContext {
            labels: translations.labels(Locale::Fr),
            listing: &listing,
            title: "CV".to_string(),
            heading: "CV".to_string(),
            favicon: None,
        };
        let html = render_error_page(&ctx, "SOURCE_UNREACHABLE");

        assert!(html.contains("<html lang=\"fr\">"));
        assert!(html.contains("disabled=\"disabled\""));
        assert!(html.contains("<code class=\"error-code\">SOURCE_UNREACHABLE</code>"));
        assert!(!html.contains("id=\"cv\""));
        assert!(html.contains("<option value=\"\" selected=\"selected\">"));
    }
}

// CV page rendering: a small element tree, the section builders that fill it from
// the document, and the page shell around it.

pub mod handlers;
pub mod page;
pub mod sections;
pub mod tree;

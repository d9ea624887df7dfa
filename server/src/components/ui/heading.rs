use maud::{html, Markup, Render};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingLevel {
    H1,
    H2,
}

pub struct Heading {
    pub text: String,
    pub level: HeadingLevel,
}

impl Heading {
    pub fn h1(text: &str) -> Self {
        Self {
            text: text.to_string(),
            level: HeadingLevel::H1,
        }
    }

    pub fn h2(text: &str) -> Self {
        Self {
            text: text.to_string(),
            level: HeadingLevel::H2,
        }
    }
}

impl Render for Heading {
    fn render(&self) -> Markup {
        match self.level {
            HeadingLevel::H1 => html! { h1 class="text-3xl font-bold mb-3 text-gray-900" { (self.text) } },
            HeadingLevel::H2 => html! { h2 class="text-xl font-semibold mb-2 text-gray-800" { (self.text) } },
        }
    }
}

use maud::{html, Markup, Render};

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
}

pub struct Button {
    pub text: String,
    pub href: Option<String>,
    pub variant: ButtonVariant,
    pub full_width: bool,
}

impl Button {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
            variant: ButtonVariant::Secondary,
            full_width: false,
        }
    }

    pub fn primary(text: &str) -> Self {
        Self::new(text).variant(ButtonVariant::Primary)
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }

    fn variant_classes(&self) -> &'static str {
        match self.variant {
            ButtonVariant::Primary => "bg-indigo-600 hover:bg-indigo-700 text-white",
            ButtonVariant::Secondary => {
                "bg-white hover:bg-gray-50 text-indigo-600 border border-indigo-300"
            }
        }
    }
}

impl Render for Button {
    fn render(&self) -> Markup {
        let classes = format!(
            "{} {} py-2 px-4 font-medium rounded-lg shadow-sm flex items-center justify-center",
            self.variant_classes(),
            if self.full_width { "w-full" } else { "" },
        );

        match &self.href {
            Some(href) => html! { a href=(href) class=(classes) { (self.text) } },
            None => html! { button type="button" class=(classes) { (self.text) } },
        }
    }
}

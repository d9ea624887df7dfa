use maud::{html, Markup, Render, DOCTYPE};

pub struct Page {
    pub title: String,
    pub content: Box<dyn Render + Send>,
}

impl Page {
    pub fn new(title: &str, content: impl Render + Send + 'static) -> Self {
        Self {
            title: title.to_string(),
            content: Box::new(content),
        }
    }
}

impl Render for Page {
    fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    title { (self.title) }
                    script src="https://unpkg.com/@tailwindcss/browser@4" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                }
                body {
                    div class="min-h-screen bg-white md:bg-gradient-to-br md:from-slate-100 md:to-indigo-100 py-4 md:py-8 px-0 sm:px-4" {
                        (self.content.render())

                        div class="mt-6 text-center text-sm text-gray-500" {
                            p { "OpenID Connect demo client" }
                        }
                    }
                }
            }
        }
    }
}

impl axum::response::IntoResponse for Page {
    fn into_response(self) -> axum::response::Response {
        self.render().into_response()
    }
}

pub struct Card {
    pub content: Box<dyn Render + Send>,
    pub max_width: Option<String>,
}

impl Card {
    pub fn new(content: impl Render + Send + 'static) -> Self {
        Self {
            content: Box::new(content),
            max_width: None,
        }
    }

    pub fn with_max_width(mut self, max_width: &str) -> Self {
        self.max_width = Some(max_width.to_string());
        self
    }
}

impl Render for Card {
    fn render(&self) -> Markup {
        let width_class = self.max_width.as_deref().unwrap_or("max-w-md");

        html! {
            div class={(width_class) " mx-auto bg-white rounded-xl border border-gray-100 shadow-lg overflow-hidden w-full px-8 py-6"} {
                (self.content.render())
            }
        }
    }
}

use maud::{html, Markup, PreEscaped, Render};

pub struct HiddenField {
    pub name: String,
    pub value: String,
}

impl HiddenField {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl Render for HiddenField {
    fn render(&self) -> Markup {
        html! {
            input type="hidden" name=(self.name) value=(self.value);
        }
    }
}

/// A POST form that submits itself as soon as the page loads.
///
/// Used when the request carries a `claims` parameter too long for a GET
/// query string. A visible button covers browsers with scripting disabled.
pub struct AutoSubmitForm {
    pub action: String,
    pub fields: Vec<HiddenField>,
}

impl AutoSubmitForm {
    pub const FORM_ID: &'static str = "oidc-authorize";

    pub fn new(action: &str, fields: &[(String, String)]) -> Self {
        Self {
            action: action.to_string(),
            fields: fields
                .iter()
                .map(|(name, value)| HiddenField::new(name, value))
                .collect(),
        }
    }
}

impl Render for AutoSubmitForm {
    fn render(&self) -> Markup {
        html! {
            form id=(Self::FORM_ID) method="post" action=(self.action) {
                @for field in &self.fields {
                    (field)
                }
                noscript {
                    button type="submit" class="bg-indigo-600 text-white rounded-lg py-2 px-4" {
                        "Continue to sign in"
                    }
                }
            }
            script {
                (PreEscaped(format!(
                    "document.getElementById('{}').submit();",
                    Self::FORM_ID
                )))
            }
        }
    }
}

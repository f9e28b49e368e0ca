//! Server-rendered HTML

use crate::i18n::Translation;
use crate::validation::{ContactSubmission, Field, FieldErrors, MESSAGE_MAX, MESSAGE_MIN, NAME_MAX, NAME_MIN};

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inline error under a form field; nothing for an empty message
pub fn field_error_message(message: &str) -> String {
    if message.is_empty() {
        return String::new();
    }
    format!(
        r#"<p style="color: red; font-size: 0.875rem; margin-top: 0.25rem;">{}</p>"#,
        escape_html(message)
    )
}

/// A button that navigates the browser to `href`
pub fn link_button(caption: &str, href: &str) -> String {
    format!(
        r#"<button type="button" data-href="{}" onclick="window.location.href = this.dataset.href">{}</button>"#,
        escape_html(href),
        escape_html(caption)
    )
}

fn document(lang: &str, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(lang),
        escape_html(title),
        body
    )
}

/// Landing page: the viewer mount point and the navigation buttons
pub fn index_page() -> String {
    let buttons = [("Contact", "/contact"), ("Login", "/login"), ("About", "/about")]
        .iter()
        .map(|(caption, href)| link_button(caption, href))
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"<div>
<canvas id="viewer" style="position: fixed; inset: 0; width: 100%; height: 100%; z-index: 1;"></canvas>
<div style="z-index: 2; position: relative; background-color: rgba(140, 232, 155, 0.5); padding: 2rem 1rem;">
<div style="max-width: 768px; margin: 0 auto; display: flex; flex-direction: column; align-items: center;">
<h1>Welcome to Ultra-V</h1>
<p>3D viewer powered by wgpu.</p>
<p>
{}
</p>
</div>
</div>
</div>"#,
        buttons
    );
    document("en", "Ultra-V", &body)
}

/// What the contact page shows
#[derive(Debug, Clone, Copy)]
pub struct ContactView<'a> {
    pub translation: &'a Translation,
    pub success: bool,
    /// Translated messages per field
    pub errors: Option<&'a FieldErrors>,
    /// Values to put back into the form
    pub submitted: Option<&'a ContactSubmission>,
}

impl<'a> ContactView<'a> {
    pub fn empty(translation: &'a Translation) -> Self {
        Self {
            translation,
            success: false,
            errors: None,
            submitted: None,
        }
    }

    fn error_for(&self, field: Field) -> String {
        self.errors
            .and_then(|errors| errors.first(field))
            .map(field_error_message)
            .unwrap_or_default()
    }

    fn value_of(&self, field: Field) -> String {
        let value = self.submitted.map(|s| match field {
            Field::Name => s.name.as_str(),
            Field::Email => s.email.as_str(),
            Field::Message => s.message.as_str(),
        });
        escape_html(value.unwrap_or_default())
    }
}

pub fn contact_page(view: &ContactView<'_>) -> String {
    let t = view.translation;
    let content = if view.success {
        format!(
            "<div role=\"alert\">\n<p>{}</p>\n</div>\n",
            escape_html(&t.form.success_message)
        )
    } else {
        format!(
            r#"<form method="POST" novalidate>
<input type="hidden" name="lang" value="{lang}">
<div>
<label for="name">{name_label}</label>
<input type="text" id="name" name="name" minlength="{name_min}" maxlength="{name_max}" value="{name}">
{name_error}
</div>
<div>
<label for="email">{email_label}</label>
<input type="email" id="email" name="email" value="{email}">
{email_error}
</div>
<div>
<label for="message">{message_label}</label>
<textarea id="message" name="message" rows="4" minlength="{message_min}" maxlength="{message_max}">{message}</textarea>
{message_error}
</div>
<div>
<button type="submit">{submit}</button>
</div>
</form>
"#,
            lang = t.lang.code(),
            name_label = escape_html(&t.form.name),
            name_min = NAME_MIN,
            name_max = NAME_MAX,
            name = view.value_of(Field::Name),
            name_error = view.error_for(Field::Name),
            email_label = escape_html(&t.form.email),
            email = view.value_of(Field::Email),
            email_error = view.error_for(Field::Email),
            message_label = escape_html(&t.form.message),
            message_min = MESSAGE_MIN,
            message_max = MESSAGE_MAX,
            message = view.value_of(Field::Message),
            message_error = view.error_for(Field::Message),
            submit = escape_html(&t.form.submit),
        )
    };
    let body = format!("<div>\n<h1>{}</h1>\n{}</div>", escape_html(&t.form.title), content);

    document(t.lang.code(), &t.form.title, &body)
}

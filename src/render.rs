//! Turns a validated contact form into the subject and bodies of the
//! notification email.

use html_escape::encode_text;

pub const MESSAGE_PLACEHOLDER: &str = "N/A";
pub const SEARCH_TAG: &str = "Avera-Contact";
pub const FOOTER: &str = "This email was generated from the Avera Consultants website contact form.";

/// A submission that passed validation. `message` may still be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub role: String,
    pub service: String,
    pub message: Option<String>,
}

impl ContactForm {
    pub fn message_or_placeholder(&self) -> &str {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message,
            _ => MESSAGE_PLACEHOLDER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn render(form: &ContactForm) -> RenderedEmail {
    RenderedEmail {
        subject: subject(form),
        text: text_body(form),
        html: html_body(form),
    }
}

fn subject(form: &ContactForm) -> String {
    format!("New Contact Form: {} (from {})", form.service, form.name)
}

fn search_tags(form: &ContactForm) -> String {
    format!("[{SEARCH_TAG}] [{}] [{}]", form.service, form.role)
}

fn text_body(form: &ContactForm) -> String {
    format!(
        "New Contact Form Submission\n\
         \n\
         Name: {}\n\
         Email: {}\n\
         Role: {}\n\
         Service: {}\n\
         Message: {}\n\
         \n\
         Search Tags: {}\n",
        form.name,
        form.email,
        form.role,
        form.service,
        form.message_or_placeholder(),
        search_tags(form),
    )
}

fn html_row(label: &str, value: &str, shaded: bool) -> String {
    let row_style = if shaded {
        r#" style="background:#f9f9f9;""#
    } else {
        ""
    };
    let label_style = if label == "Message" {
        "padding:8px; font-weight:bold; vertical-align:top;"
    } else {
        "padding:8px; font-weight:bold; width:150px;"
    };

    format!(
        "    <tr{row_style}>\n      <td style=\"{label_style}\">{label}:</td>\n      <td style=\"padding:8px;\">{}</td>\n    </tr>\n",
        encode_text(value)
    )
}

fn html_body(form: &ContactForm) -> String {
    let rows = [
        ("Name", form.name.as_str()),
        ("Email", form.email.as_str()),
        ("Role", form.role.as_str()),
        ("Service", form.service.as_str()),
        ("Message", form.message_or_placeholder()),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (label, value))| html_row(label, value, i % 2 == 1))
    .collect::<String>();

    format!(
        "<div style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">\n\
         \x20 <h2 style=\"color: #d37650; margin-bottom: 10px;\">New Contact Form Submission</h2>\n\
         \x20 <table style=\"width:100%; border-collapse: collapse;\">\n\
         {rows}\
         \x20 </table>\n\
         \x20 <p style=\"margin-top:20px; font-size:0.9em; color:#555;\">\n\
         \x20   \u{1f516} Search Tags: <b>[{SEARCH_TAG}]</b> <b>[{}]</b> <b>[{}]</b>\n\
         \x20 </p>\n\
         \x20 <hr style=\"margin:20px 0; border:none; border-top:1px solid #eee;\" />\n\
         \x20 <p style=\"font-size:0.85em; color:#888;\">{FOOTER}</p>\n\
         </div>\n",
        encode_text(&form.service),
        encode_text(&form.role),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(message: Option<&str>) -> ContactForm {
        ContactForm {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            role: "Manager".to_string(),
            service: "Consulting".to_string(),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn subject_names_service_and_sender() {
        let email = render(&form(Some("Hello")));
        assert_eq!(email.subject, "New Contact Form: Consulting (from Jane)");
    }

    #[test]
    fn text_body_lists_every_field() {
        let email = render(&form(Some("Hello")));

        assert_eq!(
            email.text,
            "New Contact Form Submission\n\
             \n\
             Name: Jane\n\
             Email: jane@x.com\n\
             Role: Manager\n\
             Service: Consulting\n\
             Message: Hello\n\
             \n\
             Search Tags: [Avera-Contact] [Consulting] [Manager]\n"
        );
    }

    #[test]
    fn missing_or_empty_message_uses_placeholder() {
        for message in [None, Some("")] {
            let email = render(&form(message));

            assert!(email.text.contains("Message: N/A\n"));
            assert!(email.html.contains("<td style=\"padding:8px;\">N/A</td>"));
        }
    }

    #[test]
    fn html_body_carries_tags_and_footer() {
        let email = render(&form(Some("Hello")));

        assert!(
            email
                .html
                .contains("<b>[Avera-Contact]</b> <b>[Consulting]</b> <b>[Manager]</b>")
        );
        assert!(email.html.contains(FOOTER));
        assert!(email.html.contains("<td style=\"padding:8px;\">Hello</td>"));
        assert_eq!(email.html.matches("<tr").count(), 5);
        assert_eq!(email.html.matches("background:#f9f9f9").count(), 2);
    }

    #[test]
    fn html_values_are_escaped_but_text_is_not() {
        let mut form = form(Some("<script>alert(1)</script>"));
        form.name = "Tom & Jerry".to_string();
        let email = render(&form);

        assert!(email.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(email.html.contains("Tom &amp; Jerry"));
        assert!(!email.html.contains("<script>"));
        assert!(email.text.contains("Message: <script>alert(1)</script>"));
        assert_eq!(email.subject, "New Contact Form: Consulting (from Tom & Jerry)");
    }

    #[test]
    fn rendering_is_deterministic() {
        let form = form(Some("Hello"));
        assert_eq!(render(&form), render(&form));
    }
}

//! Email templating

use obra_errors::{AppError, AppResult};
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

/// Template manager over a directory of html/txt templates
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    pub fn new(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Ok(Self { tera })
    }

    /// In-memory templates, used by tests
    pub fn from_strings(templates: HashMap<String, String>) -> AppResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!("Failed to render template {}: {}", template_name, e))
        })
    }

    /// Password reset mail; returns (html, text)
    pub fn render_password_reset(
        &self,
        user_name: &str,
        reset_link: &str,
        expires_in_minutes: u32,
    ) -> AppResult<(String, String)> {
        let mut context = tera::Context::new();
        context.insert("user_name", user_name);
        context.insert("reset_link", reset_link);
        context.insert("expires_in_minutes", &expires_in_minutes);

        let html = self
            .tera
            .render("password_reset.html", &context)
            .map_err(|e| AppError::internal(format!("Failed to render HTML template: {}", e)))?;

        let text = self
            .tera
            .render("password_reset.txt", &context)
            .map_err(|e| AppError::internal(format!("Failed to render text template: {}", e)))?;

        Ok((html, text))
    }

    /// Owner invitation mail sent when a unit is linked to its buyer
    pub fn render_owner_invitation(
        &self,
        owner_name: &str,
        unit_label: &str,
        login_link: &str,
    ) -> AppResult<(String, String)> {
        let mut context = tera::Context::new();
        context.insert("owner_name", owner_name);
        context.insert("unit_label", unit_label);
        context.insert("login_link", login_link);

        let html = self
            .tera
            .render("owner_invitation.html", &context)
            .map_err(|e| AppError::internal(format!("Failed to render HTML template: {}", e)))?;

        let text = self
            .tera
            .render("owner_invitation.txt", &context)
            .map_err(|e| AppError::internal(format!("Failed to render text template: {}", e)))?;

        Ok((html, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_from_strings() {
        let mut templates = HashMap::new();
        templates.insert(
            "test.html".to_string(),
            "<h1>Olá {{ name }}!</h1>".to_string(),
        );

        let template = EmailTemplate::from_strings(templates).unwrap();

        let context = serde_json::json!({
            "name": "Maria"
        });

        let result = template.render("test.html", &context).unwrap();
        assert_eq!(result, "<h1>Olá Maria!</h1>");
    }

    #[test]
    fn test_render_password_reset() {
        let mut templates = HashMap::new();
        templates.insert(
            "password_reset.html".to_string(),
            "<a href=\"{{ reset_link }}\">{{ user_name }}</a>".to_string(),
        );
        templates.insert(
            "password_reset.txt".to_string(),
            "{{ user_name }}: {{ reset_link }} ({{ expires_in_minutes }} min)".to_string(),
        );

        let template = EmailTemplate::from_strings(templates).unwrap();
        let (html, text) = template
            .render_password_reset("Maria", "https://obra.app.br/r/abc", 15)
            .unwrap();

        assert!(html.contains("https://obra.app.br/r/abc"));
        assert!(text.contains("15 min"));
    }
}

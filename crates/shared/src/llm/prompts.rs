pub const DISEASE_PLACEHOLDER: &str = "{disease}";

pub const DEFAULT_PERSONA_TEMPLATE: &str = "You are a helpful assistant for farmers. \
A model predicts plant diseases from input images. \
Guide farmers based on their queries. Disease: {disease}. \
Try to reply in short sentences since it is like a chatting application. \
Avoid using symbols like ** or __ in your responses.";

/// Seed instructions for a chat session, rendered once per session with the predicted disease.
#[derive(Debug, Clone)]
pub struct PersonaTemplate {
    template: String,
}

impl PersonaTemplate {
    /// A template without the `{disease}` placeholder gets the disease appended so the
    /// seed turn always names it.
    pub fn new(template: impl Into<String>) -> Self {
        let mut template = template.into();
        if !template.contains(DISEASE_PLACEHOLDER) {
            template.push_str(" Disease: ");
            template.push_str(DISEASE_PLACEHOLDER);
            template.push('.');
        }
        Self { template }
    }

    pub fn render(&self, disease: &str) -> String {
        self.template.replace(DISEASE_PLACEHOLDER, disease)
    }
}

impl Default for PersonaTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::PersonaTemplate;

    #[test]
    fn default_template_embeds_disease_and_style_rules() {
        let rendered = PersonaTemplate::default().render("Tomato_Late_blight");
        assert!(rendered.contains("Disease: Tomato_Late_blight."));
        assert!(rendered.contains("short sentences"));
        assert!(rendered.contains("Avoid using symbols like ** or __"));
        assert!(!rendered.contains("{disease}"));
    }

    #[test]
    fn custom_template_without_placeholder_still_names_disease() {
        let rendered = PersonaTemplate::new("Be brief.").render("Corn_Common_rust");
        assert_eq!(rendered, "Be brief. Disease: Corn_Common_rust.");
    }
}

use crate::agent::ChatAgent;
use minijinja::{ context, Environment };

const INDEX_NAME: &str = "index.html";
const INDEX_TEMPLATE: &str = include_str!("../../static/index.html");

/// Renders the chat page. The `.html` template name turns on HTML
/// auto-escaping for every profile value.
pub fn render_index(agent: &ChatAgent, ws_port: u16) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(INDEX_NAME, INDEX_TEMPLATE)?;

    env.get_template(INDEX_NAME)?.render(
        context! {
            page => &agent.profile().page,
            config_error => agent.config_error(),
            ws_port => ws_port,
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profile::ChatProfile;
    use crate::config::ConfigError;
    use crate::llm::chat::scripted::ScriptedChatClient;
    use std::sync::Arc;

    fn unconfigured(profile: ChatProfile) -> ChatAgent {
        ChatAgent::unconfigured(Arc::new(profile), ConfigError::MissingApiKey)
    }

    #[test]
    fn configured_page_lists_sites_and_enables_form() {
        let agent = ChatAgent::with_client(
            Arc::new(ChatProfile::default()),
            Arc::new(ScriptedChatClient::answering(&[]))
        );
        let html = render_index(&agent, 4000).unwrap();

        assert!(html.contains("<h1>Generative AI Chatbot for Analysis Customer Review</h1>"));
        assert!(html.contains("seat-reviews"));
        assert!(html.contains(">Lounge Website</a>"));
        assert!(html.contains(":4000\""));
        assert!(!html.contains("role=\"alert\""));
        assert!(!html.contains("disabled>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn unconfigured_page_shows_blocking_error() {
        let html = render_index(&unconfigured(ChatProfile::default()), 4000).unwrap();

        assert!(
            html.contains(
                "<div class=\"config-error\" role=\"alert\">API key not found. Please set GEMINI_API_KEY in the .env file.</div>"
            )
        );
        assert!(html.contains("placeholder=\"Type your question here...\" disabled>"));
    }

    #[test]
    fn profile_text_is_escaped() {
        let mut profile = ChatProfile::default();
        profile.page.title = "<script>x</script>".to_string();
        let html = render_index(&unconfigured(profile), 1).unwrap();

        assert!(html.contains("&lt;script&gt;x"));
        assert!(!html.contains("<script>x"));
    }

    #[test]
    fn template_syntax_in_profile_stays_literal() {
        let mut profile = ChatProfile::default();
        profile.page.title = "Reviews {{ config_error }} {{CONFIG_ERROR}}".to_string();
        let html = render_index(&unconfigured(profile), 1).unwrap();

        assert!(html.contains("<h1>Reviews {{ config_error }} {{CONFIG_ERROR}}</h1>"));
        assert_eq!(html.matches("role=\"alert\"").count(), 1);
    }
}

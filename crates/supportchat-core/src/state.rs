use crate::theme::ColorPalette;

pub const DEFAULT_CHATBOT_NAME: &str = "Chat Support";

/// Process-wide widget state, one instance for the page lifetime. Fields
/// are private: external code reads through the accessors and every write
/// goes through a controller operation, which is what keeps the
/// single-flight discipline intact.
#[derive(Debug, Default)]
pub struct WidgetState {
    is_open: bool,
    session_id: Option<i64>,
    is_loading: bool,
    tenant_id: Option<i64>,
    chatbot_name: Option<String>,
    colors: Option<ColorPalette>,
    company_name: Option<String>,
}

impl WidgetState {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn session_id(&self) -> Option<i64> {
        self.session_id
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn tenant_id(&self) -> Option<i64> {
        self.tenant_id
    }

    pub fn chatbot_name(&self) -> &str {
        self.chatbot_name.as_deref().unwrap_or(DEFAULT_CHATBOT_NAME)
    }

    pub fn colors(&self) -> Option<&ColorPalette> {
        self.colors.as_ref()
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub(crate) fn set_session(&mut self, id: i64) {
        self.session_id = Some(id);
    }

    pub(crate) fn set_branding(
        &mut self,
        tenant_id: i64,
        chatbot_name: String,
        colors: ColorPalette,
        company_name: Option<String>,
    ) {
        self.tenant_id = Some(tenant_id);
        self.chatbot_name = Some(chatbot_name);
        self.colors = Some(colors);
        self.company_name = company_name;
    }
}

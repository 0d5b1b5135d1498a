use serde::Serialize;

/// View of the coordinator for a front end.
///
/// Always derived from coordinator state, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub is_logged_in: bool,
    pub errors: Option<String>,
    pub show_signing_widget: bool,
    pub last_sign_result: Option<String>,
}

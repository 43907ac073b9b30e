//! Knowledge panel extraction
//!
//! Reads the entity side panel from the results page that
//! [`crate::web_search`] already loaded. No navigation happens here.

use tracing::{debug, info};

use crate::extraction::{DomQuery, PanelStrategies, resolve_field};
use crate::profile::KnowledgePanel;
use crate::web_search::ResultsPage;

/// Resolve the four panel fields independently
///
/// Returns an all-unresolved panel when the results page never loaded.
pub async fn extract_panel<D: DomQuery + ?Sized>(
    dom: &D,
    state: ResultsPage,
    strategies: &PanelStrategies,
) -> KnowledgePanel {
    if !state.is_loaded() {
        debug!("Results page unavailable, skipping knowledge panel");
        return KnowledgePanel::default();
    }

    let panel = KnowledgePanel {
        title: resolve_field(dom, &strategies.title).await,
        subtitle: resolve_field(dom, &strategies.subtitle).await,
        description: resolve_field(dom, &strategies.description).await,
        born: resolve_field(dom, &strategies.born).await,
    };

    let resolved = [&panel.title, &panel.subtitle, &panel.description, &panel.born]
        .iter()
        .filter(|f| f.is_some())
        .count();
    info!("Knowledge panel resolved {}/4 fields", resolved);
    panel
}

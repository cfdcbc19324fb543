//! Games and book lookups that feed the web-view picker and `@name`
//! autocomplete.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use canvas::mention::CharacterVoice;
use canvas::model::CanvasModel;
use tracing::debug;

use crate::api::{ApiError, CatalogApi, Game};

/// The only game type that can back a web-view page.
pub const WEBVIEW_GAME_TYPE: &str = "webview";

/// Keep the games a web-view page can embed: `webview` type with a URL.
#[must_use]
pub fn webview_games(games: Vec<Game>) -> Vec<Game> {
    games
        .into_iter()
        .filter(|g| g.game_type == WEBVIEW_GAME_TYPE && g.url.as_deref().is_some_and(|u| !u.trim().is_empty()))
        .collect()
}

/// # Errors
///
/// Returns the [`ApiError`] from the games request.
pub async fn fetch_webview_games(api: &dyn CatalogApi) -> Result<Vec<Game>, ApiError> {
    let all = api.games().await?;
    let total = all.len();
    let games = webview_games(all);
    debug!(total, webview = games.len(), "games loaded");
    Ok(games)
}

/// Character voices for the book, or none without a book.
///
/// # Errors
///
/// Returns the [`ApiError`] from the book request.
pub async fn fetch_character_voices(api: &dyn CatalogApi, book_id: &str) -> Result<Vec<CharacterVoice>, ApiError> {
    if book_id.is_empty() {
        debug!("no book selected; no character voices");
        return Ok(Vec::new());
    }
    Ok(api.book(book_id).await?.character_voices)
}

/// Point the page's web view at a catalog game.
pub fn select_game(model: &mut CanvasModel, game: &Game) {
    model.web_view.select_game(&game.id, game.url.as_deref().unwrap_or_default(), &game.title);
}

//! HTTP client for the board API.
//!
//! Issues GraphQL POST queries with an API key in the `Authorization`
//! header and paginates `items_page` by cursor until the API reports no
//! further pages or [`MAX_PAGES`] is hit. Query text is static; all
//! caller data (board id, cursor, page size) travels in the GraphQL
//! variables object, so it is JSON-encoded rather than spliced into the
//! query string.

use crate::api::types::{
    Board, Column, GraphQlError, GraphQlResponse, Item, NextPageResponse, RawBoard, RawItem,
};
use crate::error::{Error, Result};
use serde::Serialize;

use super::BoardSource;

/// Hard ceiling on pages fetched per board. Reaching it logs a warning
/// and returns what was fetched rather than looping forever on a
/// misbehaving cursor.
pub const MAX_PAGES: usize = 100;

/// Column-value selection shared by the first-page and next-page queries.
/// `display_value` only exists on computed column types, hence the
/// fragment spreads.
const ITEM_FIELDS: &str = "id name column_values { id type text value \
     ... on MirrorValue { display_value } \
     ... on BoardRelationValue { display_value } \
     ... on DependencyValue { display_value } }";

/// GraphQL request body: query text plus a variables object.
#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

/// A populated `errors` array is a hard fetch failure, regardless of
/// whether `data` was also present.
fn fail_on_errors(errors: Option<Vec<GraphQlError>>) -> Result<()> {
    match errors {
        Some(errors) if !errors.is_empty() => {
            let joined: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            Err(Error::Api(joined.join("; ")))
        }
        _ => Ok(()),
    }
}

/// Whether to follow `cursor` for another page after `pages` fetched.
/// `None` ends pagination; hitting the ceiling warns and ends it with
/// the board partially fetched.
fn next_cursor_to_follow(board_id: &str, cursor: Option<String>, pages: usize) -> Option<String> {
    let cursor = cursor?;
    if pages >= MAX_PAGES {
        tracing::warn!(board_id, pages, "page ceiling reached, returning partial board");
        return None;
    }
    Some(cursor)
}

/// Board API client.
///
/// Holds one `reqwest::Client` for the run; the API credential comes from
/// configuration, never from code.
pub struct BoardApiClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl BoardApiClient {
    /// Create a client for the given endpoint and API token.
    #[must_use]
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }

    /// POST one query and return the raw response body.
    async fn post_query(&self, query: &str, variables: serde_json::Value) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.token)
            .json(&QueryBody { query, variables })
            .send()
            .await
            .map_err(|e| Error::Api(format!("request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("HTTP {status}: {body}")));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Api(format!("failed to read response: {e}")))
    }

    /// First-page query: board metadata, columns, and one items page.
    fn first_page_query() -> String {
        format!(
            "query ($boardId: [ID!], $pageSize: Int!) {{ boards(ids: $boardId) {{ id name \
             columns {{ id title type }} \
             items_page(limit: $pageSize) {{ cursor items {{ {ITEM_FIELDS} \
             subitems {{ {ITEM_FIELDS} }} }} }} }} }}"
        )
    }

    /// Follow-up query against a cursor from the previous page.
    fn next_page_query() -> String {
        format!(
            "query ($cursor: String!, $pageSize: Int!) \
             {{ next_items_page(cursor: $cursor, limit: $pageSize) \
             {{ cursor items {{ {ITEM_FIELDS} subitems {{ {ITEM_FIELDS} }} }} }} }}"
        )
    }

    /// Fetch the first page and the board shell.
    async fn fetch_first_page(&self, board_id: &str, page_size: u32) -> Result<RawBoard> {
        let variables = serde_json::json!({ "boardId": [board_id], "pageSize": page_size });
        let body = self
            .post_query(&Self::first_page_query(), variables)
            .await?;

        let envelope: GraphQlResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("malformed response: {e}")))?;
        fail_on_errors(envelope.errors)?;

        envelope
            .data
            .and_then(|d| d.boards.into_iter().next())
            .ok_or_else(|| Error::BoardNotFound {
                id: board_id.to_string(),
            })
    }

    /// Fetch one follow-up page. Returns `None` when the cursor expired
    /// upstream (treated as end of pagination).
    async fn fetch_next_page(
        &self,
        cursor: &str,
        page_size: u32,
    ) -> Result<Option<(Vec<RawItem>, Option<String>)>> {
        let variables = serde_json::json!({ "cursor": cursor, "pageSize": page_size });
        let body = self
            .post_query(&Self::next_page_query(), variables)
            .await?;

        let envelope: NextPageResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("malformed response: {e}")))?;
        fail_on_errors(envelope.errors)?;

        Ok(envelope
            .data
            .and_then(|d| d.next_items_page)
            .map(|page| (page.items, page.cursor)))
    }
}

impl BoardSource for BoardApiClient {
    /// Fetch a board with all of its items, following cursors.
    ///
    /// An empty `items_page.items` is "board present, no records", not an
    /// error; a populated GraphQL `errors` array is a hard failure.
    async fn fetch_board(&self, board_id: &str, page_size: u32) -> Result<Board> {
        let raw_board = self.fetch_first_page(board_id, page_size).await?;

        let columns: Vec<Column> = raw_board
            .columns
            .iter()
            .map(|c| Column {
                id: c.id.clone(),
                title: c.title.clone(),
                kind: c.kind.clone(),
            })
            .collect();

        let mut items: Vec<Item> = raw_board.items_page.items.iter().map(RawItem::decode).collect();
        let mut pages = 1;
        let mut cursor = next_cursor_to_follow(board_id, raw_board.items_page.cursor, pages);

        while let Some(cur) = cursor {
            match self.fetch_next_page(&cur, page_size).await? {
                Some((raw_items, next)) => {
                    items.extend(raw_items.iter().map(RawItem::decode));
                    pages += 1;
                    cursor = next_cursor_to_follow(board_id, next, pages);
                }
                None => cursor = None,
            }
        }

        tracing::debug!(board_id, items = items.len(), pages, "board fetched");

        Ok(Board {
            id: raw_board.id,
            name: raw_board.name,
            columns,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_query_shape() {
        let q = BoardApiClient::first_page_query();
        assert!(q.contains("boards(ids: $boardId)"));
        assert!(q.contains("items_page(limit: $pageSize)"));
        assert!(q.contains("columns { id title type }"));
        assert!(q.contains("subitems"));
    }

    #[test]
    fn test_next_page_query_shape() {
        let q = BoardApiClient::next_page_query();
        assert!(q.contains("next_items_page(cursor: $cursor, limit: $pageSize)"));
    }

    #[test]
    fn test_query_body_json_encodes_cursor() {
        // A cursor with quotes and backslashes must survive as data, not
        // splice into the query text.
        let body = QueryBody {
            query: "query ($cursor: String!) { }",
            variables: serde_json::json!({ "cursor": "ab\"c\\d", "pageSize": 50 }),
        };
        let encoded = serde_json::to_string(&body).unwrap();
        assert!(encoded.contains(r#""cursor":"ab\"c\\d""#));
    }

    #[test]
    fn test_populated_errors_array_fails_fetch() {
        let body = r#"{"data":null,"errors":[{"message":"Not authenticated"},{"message":"Complexity budget exhausted"}]}"#;
        let envelope: GraphQlResponse = serde_json::from_str(body).unwrap();
        let err = fail_on_errors(envelope.errors).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
        let message = err.to_string();
        assert!(message.contains("Not authenticated"));
        assert!(message.contains("Complexity budget exhausted"));
    }

    #[test]
    fn test_absent_or_empty_errors_array_is_ok() {
        assert!(fail_on_errors(None).is_ok());
        assert!(fail_on_errors(Some(Vec::new())).is_ok());
    }

    #[test]
    fn test_pagination_stops_at_page_ceiling() {
        // Below the ceiling the cursor is followed; at it, pagination
        // ends with whatever was fetched.
        let next = next_cursor_to_follow("b", Some("cur".to_string()), MAX_PAGES - 1);
        assert_eq!(next.as_deref(), Some("cur"));
        assert_eq!(next_cursor_to_follow("b", Some("cur".to_string()), MAX_PAGES), None);
    }

    #[test]
    fn test_pagination_stops_on_exhausted_cursor() {
        assert_eq!(next_cursor_to_follow("b", None, 1), None);
    }

    #[test]
    fn test_empty_items_page_is_ok() {
        let body = r#"{"data":{"boards":[{"id":"1","name":"Tasks","columns":[],"items_page":{"cursor":null,"items":[]}}]}}"#;
        let envelope: GraphQlResponse = serde_json::from_str(body).unwrap();
        let board = envelope.data.unwrap().boards.into_iter().next().unwrap();
        assert!(board.items_page.items.is_empty());
        assert!(board.items_page.cursor.is_none());
    }
}

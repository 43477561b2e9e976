//! In-process stand-in for the token endpoint and the Sheets values API.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};

use crate::auth::{ServiceAccountAuth, ServiceAccountCredentials};
use crate::client::SheetsClient;

pub(crate) const TEST_PRIVATE_KEY: &str = include_str!("testdata/service_account_key.pem");
pub(crate) const SPREADSHEET_ID: &str = "test-spreadsheet";

type Grid = Vec<Vec<String>>;

#[derive(Default)]
struct ApiState {
    sheets: Mutex<Vec<(String, Grid)>>,
    requests: Mutex<Vec<String>>,
    token_requests: AtomicUsize,
    last_grant_type: Mutex<Option<String>>,
    reject_tokens: AtomicBool,
}

pub(crate) struct FakeSheetsApi {
    pub base_url: String,
    state: Arc<ApiState>,
}

impl FakeSheetsApi {
    pub async fn start() -> Self {
        let state = Arc::new(ApiState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    pub fn sheets_url(&self) -> String {
        format!("{}/v4/spreadsheets", self.base_url)
    }

    pub fn credentials(&self) -> ServiceAccountCredentials {
        ServiceAccountCredentials::new("bookdate@example.iam.gserviceaccount.com", TEST_PRIVATE_KEY)
    }

    pub fn auth(&self) -> Arc<ServiceAccountAuth> {
        Arc::new(
            ServiceAccountAuth::new(&self.credentials(), reqwest::Client::new())
                .unwrap()
                .with_token_uri(self.token_uri()),
        )
    }

    pub fn client(&self) -> SheetsClient {
        self.client_for(SPREADSHEET_ID)
    }

    pub fn client_for(&self, spreadsheet_id: &str) -> SheetsClient {
        SheetsClient::new(
            reqwest::Client::new(),
            self.auth(),
            &self.sheets_url(),
            spreadsheet_id,
        )
    }

    pub fn add_sheet(&self, title: &str, rows: Vec<Vec<&str>>) {
        let grid = rows
            .into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect();
        self.state
            .sheets
            .lock()
            .unwrap()
            .push((title.to_string(), grid));
    }

    pub fn sheet(&self, title: &str) -> Option<Grid> {
        self.state
            .sheets
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, grid)| grid.clone())
    }

    /// `METHOD path?query` of every Sheets call, with the path decoded.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn last_grant_type(&self) -> Option<String> {
        self.state.last_grant_type.lock().unwrap().clone()
    }

    pub fn reject_tokens(&self) {
        self.state.reject_tokens.store(true, Ordering::SeqCst);
    }
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, String) {
    let body = json!({ "error": { "code": status.as_u16(), "message": message } });
    (status, body.to_string())
}

fn decode(value: &str) -> String {
    urlencoding::decode(&value.replace('+', " "))
        .map(|v| v.into_owned())
        .unwrap_or_default()
}

async fn handle(
    State(state): State<Arc<ApiState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = decode(uri.path());

    if path == "/token" {
        return token(&state, &body);
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer fake-token"));
    if !authorized {
        return api_error(StatusCode::UNAUTHORIZED, "Request had invalid authentication credentials.");
    }

    state.requests.lock().unwrap().push(format!(
        "{} {}?{}",
        method,
        path,
        uri.query().unwrap_or_default()
    ));

    let Some(rest) = path.strip_prefix("/v4/spreadsheets/") else {
        return api_error(StatusCode::NOT_FOUND, "Not found.");
    };
    let (id, action) = match rest.split_once('/') {
        Some((id, action)) => (id, Some(action)),
        None => (rest, None),
    };
    let id = id.trim_end_matches(":batchUpdate");
    if id != SPREADSHEET_ID {
        return api_error(StatusCode::NOT_FOUND, "Requested entity was not found.");
    }

    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    match (method, action) {
        (Method::GET, None) => metadata(&state),
        (Method::POST, None) => add_sheet(&state, &payload),
        (method, Some(action)) => {
            let Some(range) = action.strip_prefix("values/") else {
                return api_error(StatusCode::NOT_FOUND, "Not found.");
            };
            let (range, append) = match range.strip_suffix(":append") {
                Some(range) => (range, true),
                None => (range, false),
            };
            match (method, append) {
                (Method::GET, false) => get_values(&state, range),
                (Method::PUT, false) => update_values(&state, range, &payload),
                (Method::POST, true) => append_values(&state, range, &payload),
                _ => api_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."),
            }
        }
        _ => api_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."),
    }
}

fn token(state: &ApiState, body: &str) -> (StatusCode, String) {
    let count = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    let grant_type = body
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "grant_type")
        .map(|(_, v)| decode(v));
    *state.last_grant_type.lock().unwrap() = grant_type;

    if state.reject_tokens.load(Ordering::SeqCst) {
        let body = json!({ "error": "invalid_grant", "error_description": "Invalid JWT Signature." });
        return (StatusCode::BAD_REQUEST, body.to_string());
    }

    let body = json!({
        "access_token": format!("fake-token-{}", count),
        "expires_in": 3599,
        "token_type": "Bearer",
    });
    (StatusCode::OK, body.to_string())
}

fn metadata(state: &ApiState) -> (StatusCode, String) {
    let sheets: Vec<Value> = state
        .sheets
        .lock()
        .unwrap()
        .iter()
        .map(|(title, _)| json!({ "properties": { "title": title } }))
        .collect();
    (StatusCode::OK, json!({ "sheets": sheets }).to_string())
}

fn add_sheet(state: &ApiState, payload: &Value) -> (StatusCode, String) {
    let Some(title) = payload["requests"][0]["addSheet"]["properties"]["title"].as_str() else {
        return api_error(StatusCode::BAD_REQUEST, "Invalid requests[0]");
    };
    let mut sheets = state.sheets.lock().unwrap();
    if sheets.iter().any(|(t, _)| t == title) {
        return api_error(
            StatusCode::BAD_REQUEST,
            &format!("A sheet with the name \"{}\" already exists.", title),
        );
    }
    sheets.push((title.to_string(), Vec::new()));
    (StatusCode::OK, json!({ "replies": [{}] }).to_string())
}

/// Column index and optional 1-based row of a reference such as `B7` or `A`.
fn parse_ref(reference: &str) -> (usize, Option<usize>) {
    let letters: String = reference.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let column = letters
        .chars()
        .fold(0, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1))
        - 1;
    let row = reference[letters.len()..].parse().ok();
    (column, row)
}

struct Span {
    title: String,
    first_col: usize,
    last_col: usize,
    first_row: Option<usize>,
    last_row: Option<usize>,
}

fn parse_range(range: &str) -> Option<Span> {
    let (title, cells) = range.rsplit_once('!')?;
    let title = title
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(title)
        .replace("''", "'");
    let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
    let (first_col, first_row) = parse_ref(start);
    let (last_col, last_row) = parse_ref(end);
    Some(Span {
        title,
        first_col,
        last_col,
        first_row,
        last_row,
    })
}

fn with_sheet<T>(
    state: &ApiState,
    range: &str,
    f: impl FnOnce(&Span, &mut Grid) -> T,
) -> Result<T, (StatusCode, String)> {
    let span = parse_range(range).ok_or_else(|| {
        api_error(StatusCode::BAD_REQUEST, &format!("Unable to parse range: {}", range))
    })?;
    let mut sheets = state.sheets.lock().unwrap();
    let grid = sheets
        .iter_mut()
        .find(|(t, _)| *t == span.title)
        .map(|(_, grid)| grid)
        .ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, &format!("Unable to parse range: {}", range))
        })?;
    Ok(f(&span, grid))
}

fn trim_trailing(mut rows: Grid) -> Grid {
    for row in rows.iter_mut() {
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
    }
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows
}

fn get_values(state: &ApiState, range: &str) -> (StatusCode, String) {
    let result = with_sheet(state, range, |span, grid| {
        let first = span.first_row.unwrap_or(1);
        let last = span.last_row.unwrap_or(grid.len());
        let rows: Grid = (first..=last)
            .filter_map(|r| grid.get(r - 1))
            .map(|row| {
                (span.first_col..=span.last_col)
                    .map(|c| row.get(c).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        trim_trailing(rows)
    });
    match result {
        Ok(rows) if rows.is_empty() => (StatusCode::OK, json!({ "range": range }).to_string()),
        Ok(rows) => (
            StatusCode::OK,
            json!({ "range": range, "majorDimension": "ROWS", "values": rows }).to_string(),
        ),
        Err(err) => err,
    }
}

fn payload_rows(payload: &Value) -> Grid {
    payload["values"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|c| c.as_str().unwrap_or_default().to_string())
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn write_at(grid: &mut Grid, row: usize, col: usize, values: Grid) {
    for (i, cells) in values.into_iter().enumerate() {
        let r = row + i;
        if grid.len() < r {
            grid.resize(r, Vec::new());
        }
        for (j, cell) in cells.into_iter().enumerate() {
            let target = &mut grid[r - 1];
            if target.len() <= col + j {
                target.resize(col + j + 1, String::new());
            }
            target[col + j] = cell;
        }
    }
}

fn update_values(state: &ApiState, range: &str, payload: &Value) -> (StatusCode, String) {
    let values = payload_rows(payload);
    match with_sheet(state, range, |span, grid| {
        write_at(grid, span.first_row.unwrap_or(1), span.first_col, values)
    }) {
        Ok(()) => (StatusCode::OK, json!({ "updatedRange": range }).to_string()),
        Err(err) => err,
    }
}

fn append_values(state: &ApiState, range: &str, payload: &Value) -> (StatusCode, String) {
    let values = payload_rows(payload);
    match with_sheet(state, range, |span, grid| {
        let next = trim_trailing(grid.clone()).len() + 1;
        grid.truncate(next - 1);
        write_at(grid, next, span.first_col, values)
    }) {
        Ok(()) => (StatusCode::OK, json!({ "updates": {} }).to_string()),
        Err(err) => err,
    }
}

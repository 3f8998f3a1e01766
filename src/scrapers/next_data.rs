use crate::error::ScrapeError;
use scraper::{Html, Selector};
use serde_json::Value;

/// Next.js pages ship their page props as JSON in this script tag
const NEXT_DATA_SELECTOR: &str = "script#__NEXT_DATA__";

/// Pull the embedded `__NEXT_DATA__` JSON out of a page
pub fn extract_next_data(html: &str) -> Result<Value, ScrapeError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(NEXT_DATA_SELECTOR).map_err(|_| ScrapeError::MarkerNotFound)?;

    let script = document
        .select(&selector)
        .next()
        .ok_or(ScrapeError::MarkerNotFound)?;

    let body = script.text().collect::<String>();
    if body.trim().is_empty() {
        return Err(ScrapeError::MarkerNotFound);
    }

    serde_json::from_str(&body).map_err(ScrapeError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(script_body: &str) -> String {
        format!(
            r#"<html><head><title>Odds</title></head><body>
            <div id="__next">content</div>
            <script id="__NEXT_DATA__" type="application/json">{}</script>
            </body></html>"#,
            script_body
        )
    }

    #[test]
    fn test_extracts_embedded_json() {
        let html = page(r#"{"props":{"pageProps":{"value":"a < b && c"}}}"#);
        let data = extract_next_data(&html).unwrap();
        assert_eq!(data["props"]["pageProps"]["value"], "a < b && c");
    }

    #[test]
    fn test_missing_marker() {
        let html = "<html><body><script>var x = 1;</script></body></html>";
        assert!(matches!(
            extract_next_data(html),
            Err(ScrapeError::MarkerNotFound)
        ));
    }

    #[test]
    fn test_empty_marker() {
        assert!(matches!(
            extract_next_data(&page("   ")),
            Err(ScrapeError::MarkerNotFound)
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            extract_next_data(&page(r#"{"props": {"#)),
            Err(ScrapeError::InvalidJson(_))
        ));
    }
}

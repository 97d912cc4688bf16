use crate::output;
use anyhow::{Context, Result};
use kabita_extract::Extraction;
use kabita_model::{CollectionInfo, Pagination, PoemRecord, FIRST_CONTENT_PAGE};
use regex::Regex;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

const BASE_URL: &str = "https://nazrul-rachanabali.nltr.org/page1.php";

/// Collections scraped when none are named.
pub const DEFAULT_TITLE_IDS: std::ops::RangeInclusive<u32> = 4..=23;

static PAGENO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pageno=(\d+)").expect("valid regex"));

/// HTTP settings for talking to the archive.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    /// Pause after every request.
    pub delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            user_agent: "kabita/0.1 (poem layout archiver)".to_string(),
        }
    }
}

/// What to scrape and where to put it.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub start_page: u32,
    pub max_pages: Option<u32>,
    pub output_dir: PathBuf,
    /// Write `collection_{id}.txt` / `.json` per collection.
    pub save_individual: bool,
    /// Write `all_poems.txt` / `.json` at the end.
    pub save_combined: bool,
    /// Append each poem to `<name>.txt` and `<name>.json` as soon as it's scraped.
    pub append_to: Option<PathBuf>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            start_page: FIRST_CONTENT_PAGE,
            max_pages: None,
            output_dir: PathBuf::from("scraped_poems"),
            save_individual: false,
            save_combined: true,
            append_to: None,
        }
    }
}

impl ScrapeOptions {
    fn append_paths(&self) -> Option<(PathBuf, PathBuf)> {
        self.append_to.as_ref().map(|name| {
            let base = self.output_dir.join(name);
            (base.with_extension("txt"), base.with_extension("json"))
        })
    }
}

/// Client for the Nazrul Rachanabali archive.
pub struct Scraper {
    client: reqwest::Client,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn page_url(&self, titleid: u32, pageno: u32) -> String {
        page_url(&self.config.base_url, titleid, pageno)
    }

    /// Fetch a page body, then wait out the politeness delay.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        tracing::info!(url = %url, "Fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch page")?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "HTTP {status} for {url}");

        let body = response.text().await.context("Failed to read response body")?;
        tracing::debug!(bytes = body.len(), "Received HTML");

        tokio::time::sleep(self.config.delay).await;
        Ok(body)
    }

    /// Read the page count of a collection from its first page.
    pub async fn collection_info(&self, titleid: u32) -> Result<CollectionInfo> {
        let url = self.page_url(titleid, 1);
        let html = self.fetch_page(&url).await?;
        let total_pages = parse_total_pages(&Html::parse_document(&html));
        Ok(CollectionInfo { titleid, total_pages })
    }

    /// Scrape one page. `Ok(None)` means the page held no poem.
    pub async fn scrape_poem_page(&self, titleid: u32, pageno: u32) -> Result<Option<PoemRecord>> {
        let url = self.page_url(titleid, pageno);
        let html = self.fetch_page(&url).await?;
        Ok(build_record(titleid, pageno, &url, &html))
    }

    /// Scrape every content page of one collection.
    ///
    /// Pages that fail to fetch are logged and skipped. If the first page can't
    /// be read the default page count is assumed. When `append_to` is set each
    /// poem is persisted as soon as it's scraped; a failed append is logged and
    /// the poem is still returned.
    pub async fn scrape_collection(&self, titleid: u32, options: &ScrapeOptions) -> Result<Vec<PoemRecord>> {
        tracing::info!(titleid, "Scraping collection");

        let info = match self.collection_info(titleid).await {
            Ok(info) => info,
            Err(e) => {
                let error = format!("{e:#}");
                tracing::warn!(titleid, error = %error, "Failed to read page count, using default");
                CollectionInfo { titleid, total_pages: None }
            }
        };
        let pagination = Pagination::resolve(&info, options.start_page, options.max_pages);
        tracing::info!(
            titleid,
            total_pages = ?info.total_pages,
            first = pagination.first_page,
            last = pagination.last_page,
            "Resolved pagination"
        );

        let append_paths = options.append_paths();
        let mut poems = Vec::new();

        for pageno in pagination.pages() {
            match self.scrape_poem_page(titleid, pageno).await {
                Ok(Some(record)) => {
                    tracing::info!(titleid, pageno, chars = record.content.chars().count(), "Scraped poem");
                    if let Some((text_path, json_path)) = &append_paths {
                        let appended = output::append_text(&record, text_path)
                            .and_then(|()| output::append_json(&record, json_path));
                        if let Err(e) = appended {
                            let error = format!("{e:#}");
                            tracing::error!(titleid, pageno, error = %error, "Failed to append poem");
                        }
                    }
                    poems.push(record);
                }
                Ok(None) => {
                    tracing::info!(titleid, pageno, "No content found");
                }
                Err(e) => {
                    tracing::warn!(titleid, pageno, error = %e, "Skipping page");
                }
            }
        }

        Ok(poems)
    }

    /// Scrape several collections, writing the files `options` asks for.
    ///
    /// A collection that fails to scrape or save is logged and the run moves on
    /// to the next. Its poems still go into the combined output.
    pub async fn scrape_all(&self, titleids: &[u32], options: &ScrapeOptions) -> Result<Vec<PoemRecord>> {
        let mut all_poems = Vec::new();

        for &titleid in titleids {
            let poems = match self.scrape_collection(titleid, options).await {
                Ok(poems) => poems,
                Err(e) => {
                    let error = format!("{e:#}");
                    tracing::error!(titleid, error = %error, "Failed to scrape collection");
                    continue;
                }
            };

            let start = all_poems.len();
            all_poems.extend(poems);

            if options.save_individual && all_poems.len() > start {
                let stem = format!("collection_{titleid}");
                if let Err(e) = save_pair(&all_poems[start..], &options.output_dir, &stem) {
                    let error = format!("{e:#}");
                    tracing::error!(titleid, error = %error, "Failed to save collection");
                }
            }
        }

        if options.save_combined && !all_poems.is_empty() {
            if let Err(e) = save_pair(&all_poems, &options.output_dir, "all_poems") {
                let error = format!("{e:#}");
                tracing::error!(error = %error, "Failed to save combined poems");
            }
        }

        tracing::info!(poems = all_poems.len(), collections = titleids.len(), "Scraping completed");
        Ok(all_poems)
    }
}

fn save_pair(records: &[PoemRecord], dir: &Path, stem: &str) -> Result<()> {
    output::write_text(records, &dir.join(format!("{stem}.txt")))?;
    output::write_json(records, &dir.join(format!("{stem}.json")))
}

fn page_url(base_url: &str, titleid: u32, pageno: u32) -> String {
    format!("{base_url}?pageno={pageno}&titleid={titleid}")
}

/// Highest `pageno=` linked from the page's pagination form.
pub fn parse_total_pages(document: &Html) -> Option<u32> {
    let link_sel =
        Selector::parse(r#"form[name="pageno"] a[href*="pageno="]"#).expect("valid selector");

    document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| PAGENO.captures(href))
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
}

/// Turn a fetched page into a record, or `None` if it holds no poem.
pub fn build_record(titleid: u32, pageno: u32, url: &str, html: &str) -> Option<PoemRecord> {
    let extraction = kabita_extract::extract(&kabita_extract::parse_page(html));

    if let Extraction::Unrecognized = extraction {
        tracing::debug!(titleid, pageno, "{}", kabita_extract::NO_STRUCTURE);
        return None;
    }

    let structure = extraction.structure();
    extraction
        .annotated()
        .map(|content| PoemRecord::new(titleid, pageno, url, content).with_provenance(structure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kabita_model::PageStructure;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_page_url() {
        let scraper = Scraper::new(ScraperConfig::default()).unwrap();
        assert_eq!(
            scraper.page_url(4, 2),
            "https://nazrul-rachanabali.nltr.org/page1.php?pageno=2&titleid=4"
        );
    }

    #[test]
    fn test_parse_total_pages() {
        let html = r#"
        <html><body>
        <form name="pageno" method="get">
            <a href="page1.php?pageno=1&titleid=4">1</a>
            <a href="page1.php?pageno=2&titleid=4">2</a>
            <a href="page1.php?pageno=37&titleid=4">শেষ</a>
        </form>
        <a href="page1.php?pageno=99&titleid=4">outside the form</a>
        </body></html>
        "#;
        assert_eq!(parse_total_pages(&Html::parse_document(html)), Some(37));
    }

    #[test]
    fn test_parse_total_pages_missing() {
        let html = r#"<html><body><form name="search"><a href="?pageno=5">5</a></form></body></html>"#;
        assert_eq!(parse_total_pages(&Html::parse_document(html)), None);
    }

    #[test]
    fn test_build_record() {
        let html = r#"<div id="data"><p class="kabita1">চল চল চল!</p></div>"#;
        let record = build_record(4, 2, "https://example.org", html).unwrap();
        assert_eq!(record.titleid, 4);
        assert_eq!(record.pageno, 2);
        assert_eq!(record.structure, Some(PageStructure::ColumnIndented));
        assert_eq!(record.content, "<start_poem>\n    চল চল চল !<line>\n<stanza>\n<end_poem>");
        assert!(record.fetched_at.is_some());
    }

    #[test]
    fn test_build_record_skips_empty_pages() {
        assert_eq!(build_record(4, 1, "u", "<html><body><p>সূচি</p></body></html>"), None);
        assert_eq!(build_record(4, 3, "u", r#"<p class="space"></p><p class="kabita"></p>"#), None);
    }

    #[test]
    fn test_append_paths() {
        let options = ScrapeOptions {
            output_dir: PathBuf::from("out"),
            append_to: Some(PathBuf::from("complete_nazrul_collection.txt")),
            ..ScrapeOptions::default()
        };
        let (text, json) = options.append_paths().unwrap();
        assert_eq!(text, PathBuf::from("out/complete_nazrul_collection.txt"));
        assert_eq!(json, PathBuf::from("out/complete_nazrul_collection.json"));

        assert!(ScrapeOptions::default().append_paths().is_none());
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kabita-nazrul-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn query_value(request: &str, key: &str) -> u32 {
        Regex::new(&format!(r"[?&]{key}=(\d+)"))
            .unwrap()
            .captures(request)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0)
    }

    /// A tiny archive: page 1 links to page 2, page 2 holds one poem line,
    /// later pages hold nothing. Page 1 of `broken` answers 500.
    fn archive_page(titleid: u32, pageno: u32, broken: u32) -> (&'static str, String) {
        match pageno {
            1 if titleid == broken => ("500 Internal Server Error", String::new()),
            1 => (
                "200 OK",
                format!(r#"<form name="pageno"><a href="page1.php?pageno=2&titleid={titleid}">2</a></form>"#),
            ),
            2 => (
                "200 OK",
                format!(r#"<div id="data"><p class="kabita1">কবিতা {titleid}</p></div>"#),
            ),
            _ => ("200 OK", "<p>সূচি</p>".to_string()),
        }
    }

    /// Serve [`archive_page`] on a local port and return the page URL.
    async fn serve_archive(broken: u32) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request: Vec<u8> = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let (status, body) =
                        archive_page(query_value(&request, "titleid"), query_value(&request, "pageno"), broken);
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}/page1.php")
    }

    fn local_scraper(base_url: String) -> Scraper {
        Scraper::new(ScraperConfig {
            base_url,
            delay: Duration::ZERO,
            ..ScraperConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_scrape_all_survives_failed_save() {
        let scraper = local_scraper(serve_archive(0).await);
        let dir = temp_dir("failed-save");
        // A directory where the file should go makes that collection's save fail.
        fs::create_dir_all(dir.join("collection_5.txt")).unwrap();

        let options = ScrapeOptions {
            max_pages: Some(2),
            output_dir: dir.clone(),
            save_individual: true,
            ..ScrapeOptions::default()
        };
        let poems = scraper.scrape_all(&[4, 5, 6], &options).await.unwrap();

        assert_eq!(poems.len(), 3);
        assert!(dir.join("collection_4.txt").is_file());
        assert!(dir.join("collection_6.txt").is_file());
        assert!(dir.join("all_poems.txt").is_file());

        let combined = output::read_records(&dir.join("all_poems.json")).unwrap();
        let titleids: Vec<u32> = combined.iter().map(|r| r.titleid).collect();
        assert_eq!(titleids, [4, 5, 6]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_failed_append_keeps_poem() {
        let scraper = local_scraper(serve_archive(0).await);
        let dir = temp_dir("failed-append");
        fs::create_dir_all(dir.join("stream.txt")).unwrap();

        let options = ScrapeOptions {
            max_pages: Some(2),
            output_dir: dir.clone(),
            append_to: Some(PathBuf::from("stream")),
            ..ScrapeOptions::default()
        };
        let poems = scraper.scrape_collection(4, &options).await.unwrap();

        assert_eq!(poems.len(), 1);
        assert_eq!(poems[0].pageno, 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_first_page_uses_default_count() {
        let scraper = local_scraper(serve_archive(7).await);
        let dir = temp_dir("default-count");

        let options = ScrapeOptions {
            max_pages: Some(3),
            output_dir: dir.clone(),
            ..ScrapeOptions::default()
        };
        assert!(scraper.collection_info(7).await.is_err());

        let poems = scraper.scrape_collection(7, &options).await.unwrap();
        assert_eq!(poems.len(), 1);
        assert_eq!(poems[0].titleid, 7);
        assert_eq!(poems[0].content, "<start_poem>\n    কবিতা 7<line>\n<stanza>\n<end_poem>");

        fs::remove_dir_all(&dir).unwrap();
    }
}

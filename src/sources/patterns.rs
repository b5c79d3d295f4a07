// file: src/sources/patterns.rs
// description: compiled regex patterns and css selectors for scraped sources
// reference: https://docs.rs/regex, https://docs.rs/scraper

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

lazy_static! {
    // Identifiers inside result links
    pub static ref GOOGLE_PATENT_PATH: Regex = Regex::new(
        r"/patent/([^/?#]+)"
    ).expect("GOOGLE_PATENT_PATH regex is valid");

    pub static ref USPTO_PATENT_PARAM: Regex = Regex::new(
        r"[?&]s1=(\d+)"
    ).expect("USPTO_PATENT_PARAM regex is valid");

    // Google Patents search results
    pub static ref RESULT_ITEM: Selector = Selector::parse("article.result")
        .expect("RESULT_ITEM selector is valid");

    pub static ref RESULT_LINK: Selector = Selector::parse("h3 a[href]")
        .expect("RESULT_LINK selector is valid");

    pub static ref RESULT_SNIPPET: Selector = Selector::parse("div.snippet")
        .expect("RESULT_SNIPPET selector is valid");

    // Google Patents detail page
    pub static ref DETAIL_TITLE: Selector = Selector::parse("span[itemprop=\"title\"]")
        .expect("DETAIL_TITLE selector is valid");

    pub static ref DETAIL_ABSTRACT: Selector = Selector::parse("div.abstract")
        .expect("DETAIL_ABSTRACT selector is valid");

    pub static ref DETAIL_INVENTOR: Selector = Selector::parse("dd[itemprop=\"inventor\"]")
        .expect("DETAIL_INVENTOR selector is valid");

    pub static ref DETAIL_ASSIGNEE: Selector = Selector::parse("dd[itemprop=\"assignee\"]")
        .expect("DETAIL_ASSIGNEE selector is valid");

    pub static ref DETAIL_DATE: Selector = Selector::parse("time[itemprop][datetime]")
        .expect("DETAIL_DATE selector is valid");

    pub static ref DETAIL_DESCRIPTION: Selector =
        Selector::parse("section[itemprop=\"description\"]")
            .expect("DETAIL_DESCRIPTION selector is valid");

    pub static ref DETAIL_CLAIM: Selector =
        Selector::parse("section[itemprop=\"claims\"] div.claim")
            .expect("DETAIL_CLAIM selector is valid");

    pub static ref DETAIL_CPC: Selector =
        Selector::parse("[itemprop=\"classifications\"] [itemprop=\"Code\"]")
            .expect("DETAIL_CPC selector is valid");

    // USPTO PatFT hit list
    pub static ref ANCHOR: Selector = Selector::parse("a[href]")
        .expect("ANCHOR selector is valid");
}

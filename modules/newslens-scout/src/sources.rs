//! Catalog of monitored outlets.
//!
//! The registry is built once at startup and handed to the scout by value;
//! nothing mutates it at runtime.

use std::sync::Arc;

use newslens_common::{Bias, Source, SourceCategory};

use Bias::{Center, Left, Right};
use SourceCategory::{Alternative, Government, Mainstream};

/// (name, home, feed, bias, credibility, category)
type SourceRow = (
    &'static str,
    &'static str,
    &'static str,
    Bias,
    u8,
    SourceCategory,
);

#[rustfmt::skip]
const DEFAULT_SOURCES: &[SourceRow] = &[
    // Government and institutional
    ("Government of Canada News", "https://www.canada.ca/en/news.html", "https://api.io.canada.ca/io-server/gc/news/en/v2?sort=publishedDate&orderBy=desc&pick=50&format=atom", Center, 90, Government),
    ("Prime Minister of Canada", "https://www.pm.gc.ca/en/news", "https://www.pm.gc.ca/en/news.rss", Center, 85, Government),
    ("House of Commons", "https://www.ourcommons.ca", "https://www.ourcommons.ca/en/news/rss", Center, 90, Government),
    ("Senate of Canada", "https://sencanada.ca/en/newsroom/", "https://sencanada.ca/en/rss/newsroom", Center, 90, Government),
    ("Bank of Canada", "https://www.bankofcanada.ca", "https://www.bankofcanada.ca/content_type/press-releases/feed/", Center, 92, Government),
    ("Statistics Canada", "https://www150.statcan.gc.ca/n1/dai-quo/index-eng.htm", "https://www150.statcan.gc.ca/n1/dai-quo/rss/dai-quo-eng.xml", Center, 95, Government),
    ("Elections Canada", "https://www.elections.ca", "https://www.elections.ca/rss/rss_media_e.xml", Center, 92, Government),
    ("Ontario Newsroom", "https://news.ontario.ca", "https://news.ontario.ca/en/feed", Center, 85, Government),
    ("Quebec Government News", "https://www.quebec.ca/en/news", "https://www.quebec.ca/en/news/rss", Center, 85, Government),
    ("BC Gov News", "https://news.gov.bc.ca", "https://news.gov.bc.ca/feed", Center, 85, Government),
    ("Alberta Government News", "https://www.alberta.ca/news", "https://www.alberta.ca/NewsRSS.cfm", Center, 85, Government),
    ("Parliamentary Budget Officer", "https://www.pbo-dpb.ca", "https://www.pbo-dpb.ca/en/rss", Center, 93, Government),
    // National mainstream
    ("CBC News", "https://www.cbc.ca/news", "https://www.cbc.ca/webfeed/rss/rss-politics", Left, 80, Mainstream),
    ("CTV News", "https://www.ctvnews.ca", "https://www.ctvnews.ca/rss/ctvnews-ca-politics-public-rss-1.822302", Center, 80, Mainstream),
    ("Global News", "https://globalnews.ca", "https://globalnews.ca/politics/feed/", Center, 78, Mainstream),
    ("The Globe and Mail", "https://www.theglobeandmail.com", "https://www.theglobeandmail.com/arc/outboundfeeds/rss/category/politics/", Center, 85, Mainstream),
    ("National Post", "https://nationalpost.com", "https://nationalpost.com/category/news/politics/feed", Right, 75, Mainstream),
    ("Toronto Star", "https://www.thestar.com", "https://www.thestar.com/search/?f=rss&t=article&c=politics*&l=50&s=start_time&sd=desc", Left, 78, Mainstream),
    ("Toronto Sun", "https://torontosun.com", "https://torontosun.com/category/news/national/feed", Right, 60, Mainstream),
    ("Ottawa Citizen", "https://ottawacitizen.com", "https://ottawacitizen.com/category/news/politics/feed", Center, 76, Mainstream),
    ("Montreal Gazette", "https://montrealgazette.com", "https://montrealgazette.com/category/news/politics/feed", Center, 76, Mainstream),
    ("Vancouver Sun", "https://vancouversun.com", "https://vancouversun.com/category/news/politics/feed", Center, 75, Mainstream),
    ("Calgary Herald", "https://calgaryherald.com", "https://calgaryherald.com/category/news/politics/feed", Right, 74, Mainstream),
    ("Edmonton Journal", "https://edmontonjournal.com", "https://edmontonjournal.com/category/news/politics/feed", Center, 74, Mainstream),
    ("Winnipeg Free Press", "https://www.winnipegfreepress.com", "https://www.winnipegfreepress.com/rss/?path=%2Fcanada", Center, 78, Mainstream),
    ("Maclean's", "https://macleans.ca", "https://macleans.ca/politics/feed/", Center, 77, Mainstream),
    ("The Canadian Press", "https://www.thecanadianpress.com", "https://www.thecanadianpress.com/feed/", Center, 88, Mainstream),
    ("CityNews", "https://toronto.citynews.ca", "https://toronto.citynews.ca/category/news/canada/feed/", Center, 74, Mainstream),
    ("CP24", "https://www.cp24.com", "https://www.cp24.com/rss/cp24-news-rss-1.1981357", Center, 72, Mainstream),
    ("Radio-Canada", "https://ici.radio-canada.ca", "https://ici.radio-canada.ca/rss/4175", Left, 80, Mainstream),
    ("La Presse", "https://www.lapresse.ca", "https://www.lapresse.ca/actualites/politique/rss", Center, 80, Mainstream),
    ("Le Devoir", "https://www.ledevoir.com", "https://www.ledevoir.com/rss/section/politique.xml", Left, 80, Mainstream),
    ("Le Journal de Montréal", "https://www.journaldemontreal.com", "https://www.journaldemontreal.com/rss.xml", Right, 62, Mainstream),
    ("The Hill Times", "https://www.hilltimes.com", "https://www.hilltimes.com/feed/", Center, 82, Mainstream),
    ("iPolitics", "https://www.ipolitics.ca", "https://www.ipolitics.ca/feed/", Center, 80, Mainstream),
    ("Financial Post", "https://financialpost.com", "https://financialpost.com/category/news/economy/feed", Right, 76, Mainstream),
    ("BNN Bloomberg", "https://www.bnnbloomberg.ca", "https://www.bnnbloomberg.ca/arc/outboundfeeds/rss/category/politics/", Center, 80, Mainstream),
    // International mainstream
    ("Reuters", "https://www.reuters.com", "https://www.reutersagency.com/feed/?best-regions=north-america&post_type=best", Center, 90, Mainstream),
    ("Associated Press", "https://apnews.com", "https://feeds.apnews.com/rss/apf-politics", Center, 90, Mainstream),
    ("BBC News", "https://www.bbc.com/news", "https://feeds.bbci.co.uk/news/world/us_and_canada/rss.xml", Center, 85, Mainstream),
    ("The Guardian", "https://www.theguardian.com", "https://www.theguardian.com/world/canada/rss", Left, 80, Mainstream),
    ("Al Jazeera", "https://www.aljazeera.com", "https://www.aljazeera.com/xml/rss/all.xml", Left, 72, Mainstream),
    ("NPR", "https://www.npr.org", "https://feeds.npr.org/1014/rss.xml", Left, 82, Mainstream),
    ("Fox News", "https://www.foxnews.com", "https://moxie.foxnews.com/google-publisher/politics.xml", Right, 55, Mainstream),
    ("The Wall Street Journal", "https://www.wsj.com", "https://feeds.a.dj.com/rss/RSSWorldNews.xml", Right, 84, Mainstream),
    ("The New York Times", "https://www.nytimes.com", "https://rss.nytimes.com/services/xml/rss/nyt/Politics.xml", Left, 83, Mainstream),
    ("Politico", "https://www.politico.com", "https://rss.politico.com/politics-news.xml", Center, 78, Mainstream),
    // Alternative and independent
    ("The Tyee", "https://thetyee.ca", "https://thetyee.ca/rss2.xml", Left, 68, Alternative),
    ("Canada's National Observer", "https://www.nationalobserver.com", "https://www.nationalobserver.com/front/rss", Left, 70, Alternative),
    ("rabble.ca", "https://rabble.ca", "https://rabble.ca/feed/", Left, 60, Alternative),
    ("Canadaland", "https://www.canadaland.com", "https://www.canadaland.com/feed/", Left, 65, Alternative),
    ("The Breach", "https://breachmedia.ca", "https://breachmedia.ca/feed/", Left, 58, Alternative),
    ("PressProgress", "https://pressprogress.ca", "https://pressprogress.ca/feed/", Left, 50, Alternative),
    ("The Narwhal", "https://thenarwhal.ca", "https://thenarwhal.ca/feed/", Left, 72, Alternative),
    ("The Walrus", "https://thewalrus.ca", "https://thewalrus.ca/feed/", Left, 74, Alternative),
    ("True North", "https://tnc.news", "https://tnc.news/feed/", Right, 48, Alternative),
    ("Western Standard", "https://www.westernstandard.news", "https://www.westernstandard.news/feed", Right, 45, Alternative),
    ("Rebel News", "https://www.rebelnews.com", "https://www.rebelnews.com/news.rss", Right, 30, Alternative),
    ("The Post Millennial", "https://thepostmillennial.com", "https://thepostmillennial.com/feed", Right, 35, Alternative),
    ("The Hub", "https://thehub.ca", "https://thehub.ca/feed/", Right, 70, Alternative),
    ("The Line", "https://www.readtheline.ca", "https://www.readtheline.ca/feed", Center, 68, Alternative),
    ("Policy Options", "https://policyoptions.irpp.org", "https://policyoptions.irpp.org/feed/", Center, 80, Alternative),
];

/// Immutable, cheaply clonable set of monitored outlets.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Arc<[Source]>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources: sources.into(),
        }
    }

    /// The built-in outlet catalog.
    pub fn default_catalog() -> Self {
        Self::new(
            DEFAULT_SOURCES
                .iter()
                .map(|&(name, home, feed, bias, credibility, category)| Source {
                    name: name.to_string(),
                    home_url: home.to_string(),
                    feed_url: feed.to_string(),
                    bias,
                    credibility,
                    category,
                })
                .collect(),
        )
    }

    pub fn all(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn by_category(&self, category: SourceCategory) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(move |s| s.category == category)
    }
}

//! Region profile value object
//!
//! A region profile carries everything the generators need to know about the
//! area an itinerary covers: how it should be laid out on the canvas and what
//! the background illustration should show.

use serde::{Deserialize, Serialize};

const SUMMER_ROAD_TRIP: &str = "7/2–7/5 Roth 賽事區
7/2 (四) 景點：台灣 → 德國
7/3 (五) 景點：法蘭克福機場 → Roth
7/4 (六) 景點：Roth（Challenge Roth 報到）
7/5 (日) 景點：Roth（比賽日）
7/6–7/7 Camp 1：Kirchzarten
7/6 (一) Roth → Kirchzarten 營地，戶外泳池放鬆
7/7 (二) Badeparadies Schwarzwald 水上樂園，蒂蒂湖 Titisee 湖邊小鎮
7/8–7/9 Camp 2：Feldberg / Titisee
7/8 (三) Feldberg 山區纜車、短步道健行
7/9 (四) Schluchsee 湖畔活動，Feldberg / Titisee 周邊
7/10–7/13 Camp 3：Colmar（阿爾薩斯）
7/10 (五) 上科尼斯堡城堡 Haut-Koenigsbourg、猴山 Montagne des Singes
7/11 (六) 科爾馬 Colmar（小威尼斯區、聖馬丁大教堂），里博維萊 Riquewihr
7/12 (日) Europa-Park 歐洲樂園一日遊
7/13 (一) 埃居山 Eguisheim
7/14–7/15 返回法蘭克福
7/14 (二) 開車返回法蘭克福
7/15 (三) 法蘭克福機場返台";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRegion {
    /// Display label, copied into the map state after a successful run
    pub name: String,
    /// Human-readable summary of which countries/areas the itinerary covers
    pub coverage: String,
    /// Layout hints, one per line, telling the extractor where areas sit on the canvas
    pub layout_hints: Vec<String>,
    /// Geography the background illustration should depict
    pub scenery: String,
    /// Named attractions that must become their own markers
    pub must_include: Vec<String>,
    /// Itinerary used when a trigger arrives without one
    pub sample_itinerary: String,
}

impl MapRegion {
    pub fn new(name: impl Into<String>, coverage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coverage: coverage.into(),
            layout_hints: Vec::new(),
            scenery: String::new(),
            must_include: Vec::new(),
            sample_itinerary: String::new(),
        }
    }

    pub fn with_layout_hint(mut self, hint: impl Into<String>) -> Self {
        self.layout_hints.push(hint.into());
        self
    }

    pub fn with_scenery(mut self, scenery: impl Into<String>) -> Self {
        self.scenery = scenery.into();
        self
    }

    pub fn with_required_stop(mut self, stop: impl Into<String>) -> Self {
        self.must_include.push(stop.into());
        self
    }

    pub fn with_sample_itinerary(mut self, itinerary: impl Into<String>) -> Self {
        self.sample_itinerary = itinerary.into();
        self
    }

    /// The given itinerary, or the sample one when it is blank
    pub fn itinerary_or_sample<'a>(&'a self, itinerary: &'a str) -> &'a str {
        if itinerary.trim().is_empty() {
            &self.sample_itinerary
        } else {
            itinerary
        }
    }

    /// South-west Germany and Alsace, the route of the bundled sample itinerary
    pub fn black_forest_alsace() -> Self {
        Self::new(
            "Black Forest & Alsace",
            "Germany (Roth, Frankfurt, Black Forest) and France (Alsace, Colmar)",
        )
        .with_layout_hint("The map covers Southwest Germany and Eastern France.")
        .with_layout_hint("Frankfurt is at the Top (North, low Y).")
        .with_layout_hint("Colmar/Alsace is Middle-Left (West, high Y, low X).")
        .with_layout_hint("Roth is Top-Right (East of Frankfurt).")
        .with_layout_hint(
            "Black Forest (Titisee/Feldberg/Schluchsee) is Bottom-Right (South-East).",
        )
        .with_scenery(
            "the border between France (Alsace) and Germany (Black Forest). \
             Rhine river flowing north-south in the middle. \
             Mountains (Black Forest) on the right (East), Vosges mountains on the left (West)",
        )
        .with_required_stop("Badeparadies Schwarzwald")
        .with_required_stop("Europa-Park")
        .with_required_stop("Haut-Koenigsbourg")
        .with_required_stop("Montagne des Singes")
        .with_sample_itinerary(SUMMER_ROAD_TRIP)
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::black_forest_alsace()
    }
}

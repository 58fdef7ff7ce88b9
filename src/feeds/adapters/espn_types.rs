// Source: https://site.api.espn.com/apis/site/v2/sports/golf/pga/scoreboard
// Only the fields we read; everything is optional because the feed drops keys between
// tournament states.

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Scoreboard {
    pub events: Vec<Event>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Event {
    pub name: Option<String>,
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Competition {
    pub status: Option<CompetitionStatus>,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct CompetitionStatus {
    #[serde(rename = "type")]
    pub kind: Option<StatusType>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StatusType {
    pub state: Option<String>, // "pre" | "in" | "post"
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Competitor {
    pub athlete: Option<Athlete>,
    pub order: Option<serde_json::Value>, // 1-indexed place in the field
    pub score: Option<ScoreField>,
    pub statistics: Vec<Statistic>,
    pub linescores: Vec<Linescore>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Athlete {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

// `score` is a bare string mid-event and an object in some states
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum ScoreField {
    Text(String),
    Number(f64),
    Detailed {
        #[serde(rename = "displayValue")]
        display_value: Option<String>,
    },
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Statistic {
    pub name: Option<String>,
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Linescore {
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Giveaway
// ---------------------------------------------------------------------------

/// One giveaway as returned by the upstream giveaway API.
///
/// `id` and `title` are required; a record without them fails to decode and is
/// dropped by the fetcher. Display fields default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiveawayRecord {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub worth: String,
    /// "Game", "DLC", "Early Access", ...
    #[serde(rename = "type", default, deserialize_with = "de_string_or_null")]
    pub kind: String,
    /// Comma-delimited platform list, e.g. "PC, Steam, Epic Games Store".
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub platforms: String,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub description: String,
    /// ISO date, or the "N/A" sentinel for open-ended giveaways.
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub end_date: String,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub open_giveaway_url: String,
    #[serde(default)]
    pub users: Option<u64>,
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

/// Deduplicated projection of a giveaway that can receive votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VotableGame {
    pub id: i64,
    pub title: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl VotableGame {
    /// Returns None when the record lacks a usable title.
    pub fn from_record(record: &GiveawayRecord) -> Option<Self> {
        if record.title.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: record.id,
            title: record.title.clone(),
            platform: record.platforms.clone(),
            kind: record.kind.clone(),
        })
    }
}

/// Vote payload before the store stamps its metadata.
/// Display fields are a snapshot of the giveaway at vote time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVote {
    pub game_id: i64,
    pub game_title: String,
    pub game_platform: String,
    pub game_type: String,
    pub game_thumbnail: String,
    pub game_worth: String,
    pub game_description: String,
}

impl NewVote {
    pub fn from_record(record: &GiveawayRecord) -> Self {
        Self {
            game_id: record.id,
            game_title: record.title.clone(),
            game_platform: record.platforms.clone(),
            game_type: record.kind.clone(),
            game_thumbnail: record.thumbnail.clone(),
            game_worth: record.worth.clone(),
            game_description: record.description.clone(),
        }
    }
}

/// A persisted vote. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    #[serde(deserialize_with = "de_id_lenient")]
    pub game_id: i64,
    #[serde(default)]
    pub game_title: String,
    #[serde(default)]
    pub game_platform: String,
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub game_worth: String,
    #[serde(default)]
    pub game_thumbnail: String,
    #[serde(default)]
    pub game_description: String,
    #[serde(default)]
    pub vote_id: Option<String>,
    #[serde(default)]
    pub voted_at: Option<String>,
    #[serde(default)]
    pub voted_date: Option<String>,
    #[serde(default)]
    pub voted_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Saved giveaways & subscriptions
// ---------------------------------------------------------------------------

/// A giveaway bookmarked by a visitor, with store metadata alongside the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGiveaway {
    #[serde(flatten)]
    pub giveaway: GiveawayRecord,
    pub firebase_id: String,
    pub saved_at: String,
    #[serde(default)]
    pub saved_date: String,
    #[serde(default)]
    pub saved_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub email: String,
    pub platform: String,
    pub subscribed_at: String,
    pub subscribed_date: String,
}

// ---------------------------------------------------------------------------
// Reseller products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub price: f64,
    #[serde(rename = "imgUrl", default)]
    pub img_url: String,
    #[serde(rename = "productURL", default)]
    pub product_url: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub category_id: String,
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

/// Accepts `42` or `"42"`. Store documents written by older clients carry string ids.
fn de_id_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid game id: {v}")))
}

/// Missing and `null` both decode to an empty string.
fn de_string_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn de_f64_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0.0))
}

fn de_string_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn giveaway_decodes_upstream_shape() {
        let raw = r#"{"id":2943,"title":"Eternal Threads (Epic Games) Giveaway","worth":"$19.99",
            "thumbnail":"https://www.gamerpower.com/offers/1/x.jpg","description":"Grab it",
            "open_giveaway_url":"https://www.gamerpower.com/open/eternal-threads",
            "type":"Game","platforms":"PC, Epic Games Store","end_date":"2024-05-30 23:59:00",
            "users":13210,"status":"Active"}"#;
        let g: GiveawayRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(g.id, 2943);
        assert_eq!(g.kind, "Game");
        assert_eq!(g.platforms, "PC, Epic Games Store");
        assert_eq!(g.users, Some(13210));
    }

    #[test]
    fn null_display_fields_decode_as_empty() {
        let g: GiveawayRecord = serde_json::from_str(r#"{"id":1,"title":"A","worth":null}"#).unwrap();
        assert_eq!(g.worth, "");

        let raw = r#"{"id":2,"title":"B","type":null,"platforms":null,"thumbnail":null,
            "description":null,"end_date":null,"open_giveaway_url":null,"users":null}"#;
        let g: GiveawayRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(g.kind, "");
        assert_eq!(g.platforms, "");
        assert_eq!(g.end_date, "");
        assert_eq!(g.users, None);
    }

    #[test]
    fn giveaway_without_title_is_rejected() {
        let raw = r#"{"id":1,"worth":"N/A"}"#;
        assert!(serde_json::from_str::<GiveawayRecord>(raw).is_err());
    }

    #[test]
    fn vote_accepts_string_game_id() {
        let raw = r#"{"gameId":"17","gameTitle":"A","votedAt":"2026-10-17T10:00:00Z"}"#;
        let v: VoteRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(v.game_id, 17);
        assert_eq!(v.game_platform, "");
        assert_eq!(v.voted_at.as_deref(), Some("2026-10-17T10:00:00Z"));
    }

    #[test]
    fn vote_without_game_id_is_rejected() {
        assert!(serde_json::from_str::<VoteRecord>(r#"{"gameTitle":"A"}"#).is_err());
        assert!(serde_json::from_str::<VoteRecord>(r#"{"gameId":"abc"}"#).is_err());
    }

    #[test]
    fn votable_game_requires_title() {
        let mut g: GiveawayRecord = serde_json::from_str(r#"{"id":3,"title":"  "}"#).unwrap();
        assert!(VotableGame::from_record(&g).is_none());
        g.title = "Hades".to_string();
        let game = VotableGame::from_record(&g).unwrap();
        assert_eq!(game.id, 3);
        assert_eq!(game.title, "Hades");
    }

    #[test]
    fn saved_giveaway_flattens_record() {
        let g: GiveawayRecord = serde_json::from_str(r#"{"id":8,"title":"Celeste"}"#).unwrap();
        let saved = SavedGiveaway {
            giveaway: g,
            firebase_id: "k1".to_string(),
            saved_at: "2026-10-17T10:00:00Z".to_string(),
            saved_date: "17/10/2026".to_string(),
            saved_time: "10:00:00".to_string(),
        };
        let v = serde_json::to_value(&saved).unwrap();
        assert_eq!(v["id"], 8);
        assert_eq!(v["title"], "Celeste");
        assert_eq!(v["firebaseId"], "k1");
        assert_eq!(v["savedAt"], "2026-10-17T10:00:00Z");
    }

    #[test]
    fn product_price_as_string_or_number() {
        let a: Product = serde_json::from_str(
            r#"{"title":"Mouse","price":"12.5","imgUrl":"i","productURL":"u","category_id":3}"#,
        )
        .unwrap();
        assert!((a.price - 12.5).abs() < 1e-9);
        assert_eq!(a.category_id, "3");
        let b: Product = serde_json::from_str(r#"{"title":"Pad","price":9}"#).unwrap();
        assert!((b.price - 9.0).abs() < 1e-9);
    }
}

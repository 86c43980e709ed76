use serde_json::Value;

use crate::catalog::text::strip_markup;
use crate::models::{Show, FALLBACK_RATING};

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Normalize one source payload into [`Show`] records, preserving input
/// order. Records are heterogeneous: the primary source puts fields at the
/// top level, the secondary's search results nest them under a `show`
/// wrapper. Resolution order is fixed and shape-agnostic: top-level field,
/// then nested `show.*`, then default. Records without an id or any title
/// field are dropped rather than failing the batch.
pub fn normalize_records(records: &[Value]) -> Vec<Show> {
    records.iter().filter_map(normalize_record).collect()
}

fn normalize_record(record: &Value) -> Option<Show> {
    let nested = record.get("show").filter(|v| v.is_object());

    let id = record
        .get("id")
        .and_then(Value::as_i64)
        .or_else(|| nested.and_then(|s| s.get("id")).and_then(Value::as_i64))?;

    let title = as_string(record.get("title"))
        .or_else(|| as_string(record.get("name")))
        .or_else(|| nested.and_then(|s| as_string(s.get("name"))))
        .or_else(|| nested.and_then(|s| as_string(s.get("title"))))?;

    Some(Show {
        id,
        title,
        poster_url: poster_of(record, nested),
        summary: summary_of(record, nested),
        genres: genres_of(record, nested),
        rating: rating_of(record, nested),
        release_info: as_string(record.get("release_date"))
            .or_else(|| as_string(record.get("premiered")))
            .or_else(|| nested.and_then(|s| as_string(s.get("premiered")))),
    })
}

fn as_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn poster_of(record: &Value, nested: Option<&Value>) -> Option<String> {
    if let Some(path) = as_string(record.get("poster_path")) {
        // The primary source sends image paths relative to its CDN.
        if path.starts_with("http") {
            return Some(path);
        }
        return Some(format!("{POSTER_BASE}{path}"));
    }
    image_url(record.get("image")).or_else(|| nested.and_then(|s| image_url(s.get("image"))))
}

fn image_url(value: Option<&Value>) -> Option<String> {
    let image = value?;
    as_string(image.get("medium")).or_else(|| as_string(image.get("original")))
}

fn summary_of(record: &Value, nested: Option<&Value>) -> Option<String> {
    as_string(record.get("overview"))
        .or_else(|| as_string(record.get("summary")))
        .or_else(|| nested.and_then(|s| as_string(s.get("summary"))))
        .map(|raw| strip_markup(&raw))
        .filter(|s| !s.is_empty())
}

fn rating_of(record: &Value, nested: Option<&Value>) -> f32 {
    numeric(record.get("vote_average"))
        .or_else(|| rating_average(record.get("rating")))
        .or_else(|| nested.and_then(|s| rating_average(s.get("rating"))))
        .unwrap_or(FALLBACK_RATING)
}

fn rating_average(value: Option<&Value>) -> Option<f32> {
    numeric(value?.get("average"))
}

/// Sources disagree on whether ratings are numbers or numeric strings.
fn numeric(value: Option<&Value>) -> Option<f32> {
    match value? {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn genres_of(record: &Value, nested: Option<&Value>) -> Vec<String> {
    string_list(record.get("genres"))
        .or_else(|| nested.and_then(|s| string_list(s.get("genres"))))
        .or_else(|| mapped_genre_ids(record.get("genre_ids")))
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let list = value?.as_array()?;
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn mapped_genre_ids(value: Option<&Value>) -> Option<Vec<String>> {
    let ids = value?.as_array()?;
    Some(
        ids.iter()
            .filter_map(Value::as_i64)
            .filter_map(genre_name)
            .map(str::to_string)
            .collect(),
    )
}

/// The primary source's fixed movie genre table; it only sends numeric ids
/// under plain browsing.
fn genre_name(id: i64) -> Option<&'static str> {
    let name = match id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_primary_shaped_record() {
        let records = vec![json!({
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/abc.jpg",
            "overview": "A hacker learns the truth.",
            "genre_ids": [28, 878],
            "vote_average": 8.2,
            "release_date": "1999-03-30"
        })];
        let shows = normalize_records(&records);
        assert_eq!(shows.len(), 1);
        let show = &shows[0];
        assert_eq!(show.id, 603);
        assert_eq!(show.title, "The Matrix");
        assert_eq!(
            show.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(show.genres, vec!["Action", "Science Fiction"]);
        assert!((show.rating - 8.2).abs() < 0.001);
        assert_eq!(show.release_info.as_deref(), Some("1999-03-30"));
    }

    #[test]
    fn resolves_fields_from_nested_show_wrapper() {
        let records = vec![json!({
            "score": 0.9,
            "show": {
                "id": 139,
                "name": "Girls",
                "genres": ["Drama", "Romance"],
                "premiered": "2012-04-15",
                "rating": { "average": 7.9 },
                "image": { "medium": "https://static.tvmaze.com/girls.jpg" },
                "summary": "<p>A comedy about the experiences of a group of girls.</p>"
            }
        })];
        let shows = normalize_records(&records);
        assert_eq!(shows.len(), 1);
        let show = &shows[0];
        assert_eq!(show.id, 139);
        assert_eq!(show.title, "Girls");
        assert_eq!(
            show.poster_url.as_deref(),
            Some("https://static.tvmaze.com/girls.jpg")
        );
        assert_eq!(
            show.summary.as_deref(),
            Some("A comedy about the experiences of a group of girls.")
        );
        assert!((show.rating - 7.9).abs() < 0.001);
    }

    #[test]
    fn top_level_fields_win_over_nested_ones() {
        let records = vec![json!({
            "id": 1,
            "name": "Top Level",
            "show": { "id": 2, "name": "Nested" }
        })];
        let shows = normalize_records(&records);
        assert_eq!(shows[0].id, 1);
        assert_eq!(shows[0].title, "Top Level");
    }

    #[test]
    fn rating_parses_from_string_and_defaults_when_absent() {
        let records = vec![
            json!({ "id": 1, "name": "A", "rating": { "average": "6.4" } }),
            json!({ "id": 2, "name": "B" }),
        ];
        let shows = normalize_records(&records);
        assert!((shows[0].rating - 6.4).abs() < 0.001);
        assert_eq!(shows[1].rating, FALLBACK_RATING);
    }

    #[test]
    fn drops_records_without_any_title_and_keeps_order() {
        let records = vec![
            json!({ "id": 1, "title": "First" }),
            json!({ "id": 2, "poster_path": "/x.jpg" }),
            json!({ "id": 3, "title": "Third" }),
        ];
        let shows = normalize_records(&records);
        let titles: Vec<_> = shows.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
    }

    #[test]
    fn missing_poster_stays_none_until_render() {
        let records = vec![json!({ "id": 1, "title": "Bare" })];
        let shows = normalize_records(&records);
        assert!(shows[0].poster_url.is_none());
        assert_eq!(
            shows[0].poster_or_placeholder(),
            crate::models::POSTER_PLACEHOLDER
        );
    }
}

//! Tabular (CSV) record codec for the persisted stores.
//!
//! Pure string-in / string-out encoding with no filesystem access; the
//! application crate owns reading and writing files. Parsing and quoting are
//! done by the `csv` crate.
//!
//! # Record Layouts
//!
//! | Table | Columns |
//! |-------|---------|
//! | contents | `id, title, category, duration, age_rating, views` |
//! | users | `id, username, favorite_id…` |
//! | interactions | `user_id, content_id, type, timestamp` |
//! | lists | `id, user_id, name, content_id…` |
//!
//! The first line of every table is a header and is ignored on read. Rows
//! may have any number of columns, fields are trimmed, and blank lines are
//! ignored. Rows with too few columns or unparsable numbers are skipped and
//! counted, never fatal. Line breaks inside fields are written as spaces so
//! every record stays on one line.

use std::io;

use csv::StringRecord;
use tracing::warn;

use crate::models::{Content, CustomList, Interaction, InteractionType};
use crate::store::{ContentStore, ListStore, UserInteractionStore};

pub const CONTENT_HEADER: [&str; 6] = ["id", "title", "category", "duration", "age_rating", "views"];
pub const USER_HEADER: [&str; 3] = ["id", "username", "favorites"];
pub const INTERACTION_HEADER: [&str; 4] = ["user_id", "content_id", "type", "timestamp"];
pub const LIST_HEADER: [&str; 4] = ["id", "user_id", "name", "content_ids"];

/// Outcome of decoding one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

/// Decode every data row of `text`, handing each record and its line number
/// to `insert`. Records the reader rejects are skipped with a warning.
fn load_rows<F>(table: &str, text: &str, mut insert: F) -> LoadStats
where
    F: FnMut(&StringRecord) -> Result<(), String>,
{
    let mut stats = LoadStats::default();
    for result in reader(text).records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                match insert(&record) {
                    Ok(()) => stats.loaded += 1,
                    Err(reason) => skip(table, line, &reason, &mut stats),
                }
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                skip(table, line, &e.to_string(), &mut stats);
            }
        }
    }
    stats
}

fn skip(table: &str, line: u64, reason: &str, stats: &mut LoadStats) {
    warn!(table, line, reason, "skipping row");
    stats.skipped += 1;
}

/// Encode a header and its rows as CSV text, one record per line.
///
/// Rows may be longer than the header. Fields are quoted only when they
/// contain a comma or a double quote.
pub fn encode_table<I, R>(header: &[&str], rows: I) -> csv::Result<String>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.as_ref().iter().map(|f| single_line(f)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn single_line(field: &str) -> String {
    field.replace(['\r', '\n'], " ")
}

fn parse_id(field: &str) -> Option<u32> {
    field.parse::<u32>().ok().filter(|id| *id > 0)
}

fn parse_ids<'a>(fields: impl Iterator<Item = &'a str>) -> Option<Vec<u32>> {
    fields.filter(|f| !f.is_empty()).map(parse_id).collect()
}

pub fn decode_content(record: &StringRecord) -> Option<Content> {
    if record.len() < 5 {
        return None;
    }
    let views = match record.get(5) {
        Some(v) if !v.is_empty() => v.parse().ok()?,
        _ => 0,
    };
    Some(Content {
        id: parse_id(&record[0])?,
        title: record[1].to_string(),
        category: record[2].to_string(),
        duration: record[3].parse().ok()?,
        age_rating: record[4].parse().ok()?,
        views,
    })
}

pub fn decode_interaction(record: &StringRecord) -> Option<Interaction> {
    if record.len() < 4 {
        return None;
    }
    Some(Interaction {
        user_id: parse_id(&record[0])?,
        content_id: parse_id(&record[1])?,
        kind: InteractionType::from_stored(&record[2]),
        timestamp: record[3].parse().ok()?,
    })
}

pub fn decode_list(record: &StringRecord) -> Option<CustomList> {
    if record.len() < 3 {
        return None;
    }
    Some(CustomList {
        id: parse_id(&record[0])?,
        user_id: parse_id(&record[1])?,
        name: record[2].to_string(),
        content_ids: parse_ids(record.iter().skip(3))?,
    })
}

/// Decode a user row into `(id, username, favorites)`.
pub fn decode_user(record: &StringRecord) -> Option<(u32, String, Vec<u32>)> {
    if record.len() < 2 {
        return None;
    }
    Some((
        parse_id(&record[0])?,
        record[1].to_string(),
        parse_ids(record.iter().skip(2))?,
    ))
}

const MALFORMED: &str = "malformed row";

pub fn load_contents(text: &str, store: &mut ContentStore) -> LoadStats {
    load_rows("contents", text, |record| {
        let content = decode_content(record).ok_or(MALFORMED)?;
        store.insert_loaded(content).map_err(|e| e.to_string())
    })
}

pub fn load_users(text: &str, store: &mut UserInteractionStore) -> LoadStats {
    load_rows("users", text, |record| {
        let (id, username, favorites) = decode_user(record).ok_or(MALFORMED)?;
        store
            .insert_loaded_user(id, &username, &favorites)
            .map_err(|e| e.to_string())
    })
}

/// Load the interaction log. Users must be loaded first so their counters
/// are rebuilt.
pub fn load_interactions(text: &str, store: &mut UserInteractionStore) -> LoadStats {
    load_rows("interactions", text, |record| {
        let interaction = decode_interaction(record).ok_or(MALFORMED)?;
        store.append_loaded_interaction(interaction);
        Ok(())
    })
}

pub fn load_lists(text: &str, store: &mut ListStore) -> LoadStats {
    load_rows("lists", text, |record| {
        let list = decode_list(record).ok_or(MALFORMED)?;
        store.insert_loaded(list).map_err(|e| e.to_string())
    })
}

pub fn encode_contents(store: &ContentStore) -> csv::Result<String> {
    encode_table(
        &CONTENT_HEADER,
        store.iter().map(|c| {
            vec![
                c.id.to_string(),
                c.title.clone(),
                c.category.clone(),
                c.duration.to_string(),
                c.age_rating.to_string(),
                c.views.to_string(),
            ]
        }),
    )
}

pub fn encode_users(store: &UserInteractionStore) -> csv::Result<String> {
    encode_table(
        &USER_HEADER,
        store.users().map(|u| {
            let mut row = vec![u.id.to_string(), u.username.clone()];
            row.extend(u.favorites.iter().map(|f| f.to_string()));
            row
        }),
    )
}

pub fn encode_interactions(store: &UserInteractionStore) -> csv::Result<String> {
    encode_table(
        &INTERACTION_HEADER,
        store.interactions().iter().map(|i| {
            vec![
                i.user_id.to_string(),
                i.content_id.to_string(),
                i.kind.as_str().to_string(),
                i.timestamp.to_string(),
            ]
        }),
    )
}

pub fn encode_lists(store: &ListStore) -> csv::Result<String> {
    encode_table(
        &LIST_HEADER,
        store.iter().map(|l| {
            let mut row = vec![l.id.to_string(), l.user_id.to_string(), l.name.clone()];
            row.extend(l.content_ids.iter().map(|c| c.to_string()));
            row
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(text: &str) -> Vec<Vec<String>> {
        reader(text)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_reader_trims_and_accepts_ragged_rows() {
        let text = "id,username,favorites\r\n1, ana ,3,4\r\n2,bruno\r\n";
        assert_eq!(
            records(text),
            vec![vec!["1", "ana", "3", "4"], vec!["2", "bruno"]]
        );
    }

    #[test]
    fn test_reader_unquotes_fields() {
        let text = "h\n1,\"value, with comma\",3\n\"say \"\"hi\"\"\",2\n";
        assert_eq!(
            records(text),
            vec![vec!["1", "value, with comma", "3"], vec!["say \"hi\"", "2"]]
        );
    }

    #[test]
    fn test_encode_table_quotes_only_when_needed() {
        let rows = vec![vec![
            "7".to_string(),
            "Fast, Furious".to_string(),
            "say \"hi\"".to_string(),
            "plain".to_string(),
        ]];
        let text = encode_table(&["a", "b"], &rows).unwrap();
        assert_eq!(text, "a,b\n7,\"Fast, Furious\",\"say \"\"hi\"\"\",plain\n");
        assert_eq!(records(&text), rows);
    }

    #[test]
    fn test_encode_replaces_line_breaks() {
        let rows = [vec!["a\nb".to_string(), "c\r\nd".to_string()]];
        assert_eq!(encode_table(&["x"], &rows).unwrap(), "x\na b,c  d\n");
    }

    #[test]
    fn test_load_contents_skips_header_and_malformed_rows() {
        let text = "id,title,category,duration,age_rating,views\n\
                    1,Alpha,Drama,90,12,4\n\
                    2,Beta,Comedy\n\
                    3,Gamma,Drama,abc,12,0\n\
                    4,Delta,Horror,100,18\n\
                    \n\
                    1,Dup,Drama,90,12,0\n\
                    0,Zero,Drama,90,12,0\n";
        let mut store = ContentStore::new();
        let stats = load_contents(text, &mut store);
        assert_eq!(stats, LoadStats { loaded: 2, skipped: 4 });
        assert_eq!(store.get_by_id(1).unwrap().views, 4);
        assert_eq!(store.get_by_id(4).unwrap().views, 0);
    }

    #[test]
    fn test_contents_round_trip() {
        let mut store = ContentStore::new();
        let a = store.add("Fast, Furious", "Action", 120, 16).unwrap();
        store.add("Quiet", "Drama", 95, 0).unwrap();
        store.increment_views(a).unwrap();

        let mut reloaded = ContentStore::new();
        let stats = load_contents(&encode_contents(&store).unwrap(), &mut reloaded);
        assert_eq!(stats.loaded, 2);
        for original in store.iter() {
            assert_eq!(reloaded.get_by_id(original.id), Some(original));
        }
    }

    #[test]
    fn test_users_and_interactions_round_trip() {
        let mut store = UserInteractionStore::new();
        let a = store.add_user("ana").unwrap();
        let b = store.add_user("bruno").unwrap();
        store
            .register_interaction_at(a, 3, InteractionType::Favorite, 1_700_000_000)
            .unwrap();
        store
            .register_interaction_at(b, 4, InteractionType::Complete, 1_700_000_100)
            .unwrap();
        store.add_favorite(b, 9).unwrap();

        let mut reloaded = UserInteractionStore::new();
        let users = encode_users(&store).unwrap();
        assert_eq!(load_users(&users, &mut reloaded).loaded, 2);
        let interactions = encode_interactions(&store).unwrap();
        assert_eq!(load_interactions(&interactions, &mut reloaded).loaded, 2);
        assert_eq!(reloaded.get_by_id(a).unwrap().favorites, vec![3]);
        assert_eq!(reloaded.get_by_id(b).unwrap().favorites, vec![9]);
        assert_eq!(reloaded.get_by_id(b).unwrap().interaction_count, 1);
        assert_eq!(reloaded.interactions(), store.interactions());
    }

    #[test]
    fn test_interaction_type_read_case_insensitively() {
        let text = "user_id,content_id,type,timestamp\n1,2,complete,10\n1,3,bogus,11\n";
        let mut store = UserInteractionStore::new();
        store.insert_loaded_user(1, "ana", &[]).unwrap();
        load_interactions(text, &mut store);
        assert_eq!(store.interactions()[0].kind, InteractionType::Complete);
        assert_eq!(store.interactions()[1].kind, InteractionType::Play);
        assert!(encode_interactions(&store)
            .unwrap()
            .contains("1,2,COMPLETE,10"));
    }

    #[test]
    fn test_lists_round_trip() {
        let mut store = ListStore::new();
        let id = store.create(2, "Sunday, lazy").unwrap();
        store.add_content(id, 5).unwrap();
        store.add_content(id, 1).unwrap();
        store.create(3, "empty").unwrap();

        let mut reloaded = ListStore::new();
        let text = encode_lists(&store).unwrap();
        assert_eq!(load_lists(&text, &mut reloaded).loaded, 2);
        assert_eq!(reloaded.get_by_id(id), store.get_by_id(id));
    }
}

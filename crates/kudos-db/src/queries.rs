use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use kudos_types::models::NewKudos;

use crate::Database;
use crate::models::KudosRow;

impl Database {
    /// Append-only insert. The id is generated here and the creation
    /// timestamp is assigned by the database default; the stored row is
    /// read back so the caller sees exactly what was persisted.
    pub fn insert_kudos(&self, input: &NewKudos) -> Result<KudosRow> {
        let id = Uuid::new_v4().to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kudos (id, sender_id, receiver_id, message, category)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    &id,
                    input.sender_id.to_string(),
                    input.receiver_id.to_string(),
                    &input.message,
                    input.category.as_str(),
                ],
            )?;
            query_kudos_by_id(conn, &id)
        })
    }

    /// Newest-first page of the feed. Ties on created_at break by id so
    /// repeated reads of an unchanged data set return the same order.
    pub fn list_kudos(&self, limit: u32, offset: u32) -> Result<Vec<KudosRow>> {
        self.with_conn(|conn| query_kudos_page(conn, limit, offset))
    }
}

fn query_kudos_by_id(conn: &Connection, id: &str) -> Result<KudosRow> {
    let row = conn.query_row(
        "SELECT id, sender_id, receiver_id, message, category, created_at
         FROM kudos WHERE id = ?1",
        [id],
        map_kudos_row,
    )?;
    Ok(row)
}

fn query_kudos_page(conn: &Connection, limit: u32, offset: u32) -> Result<Vec<KudosRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, sender_id, receiver_id, message, category, created_at
         FROM kudos
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![limit, offset], map_kudos_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_kudos_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<KudosRow> {
    Ok(KudosRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        message: row.get(3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use kudos_types::models::{KudosCategory, NewKudos};
    use uuid::Uuid;

    use crate::Database;

    const SENDER_ID: &str = "11111111-1111-4111-8111-111111111111";
    const RECEIVER_ID: &str = "22222222-2222-4222-8222-222222222222";

    fn new_kudos(message: &str, category: KudosCategory) -> NewKudos {
        NewKudos {
            sender_id: SENDER_ID.parse().unwrap(),
            receiver_id: RECEIVER_ID.parse().unwrap(),
            message: message.to_string(),
            category,
        }
    }

    fn seed_with_created_at(db: &Database, items: &[(&str, &str)]) {
        db.with_conn(|conn| {
            for (index, (created_at, message)) in items.iter().enumerate() {
                conn.execute(
                    "INSERT INTO kudos (id, sender_id, receiver_id, message, category, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        format!("00000000-0000-4000-8000-00000000000{}", index + 1),
                        SENDER_ID,
                        RECEIVER_ID,
                        message,
                        "Teamwork",
                        created_at,
                    ],
                )?;
            }
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn insert_assigns_id_and_timestamp_and_echoes_input() {
        let db = Database::open_in_memory().unwrap();

        let row = db
            .insert_kudos(&new_kudos("Great support on the release!", KudosCategory::Teamwork))
            .unwrap();

        assert!(Uuid::parse_str(&row.id).is_ok());
        assert_eq!(row.sender_id, SENDER_ID);
        assert_eq!(row.receiver_id, RECEIVER_ID);
        assert_eq!(row.message, "Great support on the release!");
        assert_eq!(row.category, "Teamwork");
        assert!(row.created_at.parse::<chrono::DateTime<chrono::Utc>>().is_ok());

        let dto = row.into_dto().unwrap();
        assert_eq!(dto.category, KudosCategory::Teamwork);
        assert_eq!(dto.sender_id.to_string(), SENDER_ID);
    }

    #[test]
    fn list_returns_newest_first_with_offset() {
        let db = Database::open_in_memory().unwrap();
        seed_with_created_at(
            &db,
            &[
                ("2024-01-01T00:00:00.000Z", "old"),
                ("2024-01-02T00:00:00.000Z", "middle"),
                ("2024-01-03T00:00:00.000Z", "new"),
            ],
        );

        let first_page = db.list_kudos(2, 0).unwrap();
        let messages: Vec<&str> = first_page.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["new", "middle"]);

        let second_page = db.list_kudos(2, 2).unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].message, "old");
    }

    #[test]
    fn list_on_empty_store_returns_empty_vec() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_kudos(20, 0).unwrap().is_empty());
    }

    #[test]
    fn list_order_is_stable_across_repeated_reads() {
        let db = Database::open_in_memory().unwrap();
        // Identical timestamps: the id tie-break must keep the order fixed.
        seed_with_created_at(
            &db,
            &[
                ("2024-01-01T00:00:00.000Z", "a"),
                ("2024-01-01T00:00:00.000Z", "b"),
                ("2024-01-01T00:00:00.000Z", "c"),
            ],
        );

        let first = db.list_kudos(10, 0).unwrap();
        let second = db.list_kudos(10, 0).unwrap();
        let order = |rows: &[crate::models::KudosRow]| {
            rows.iter().map(|r| r.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn category_check_constraint_rejects_unknown_labels() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kudos (id, sender_id, receiver_id, message, category)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    "33333333-3333-4333-8333-333333333333",
                    SENDER_ID,
                    RECEIVER_ID,
                    "hi",
                    "Not A Category",
                ],
            )?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn corrupt_rows_fail_dto_conversion() {
        let db = Database::open_in_memory().unwrap();
        let row = db
            .insert_kudos(&new_kudos("hi", KudosCategory::GreatJob))
            .unwrap();

        let mut corrupt = row;
        corrupt.created_at = "not-a-timestamp".to_string();
        assert!(corrupt.into_dto().is_err());
    }
}

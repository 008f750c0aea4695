//! Lemma lookups and bilingual pair search.
//!
//! Matching is `LIKE '%term%'` with wildcards escaped, run against the
//! lowercased copies stored with each entry. SQLite folds ASCII only, so the
//! term is lowercased here the same way and `ČAJ` finds `čaj`.

use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::contains_pattern;
use crate::pagination::Page;
use crate::types::{EntryMinimal, Language, SearchPair};

fn push_quick_filter(qb: &mut QueryBuilder<'_, Sqlite>, pattern: &str, language: Option<Language>) {
    qb.push(" WHERE lemma_folded LIKE ").push_bind(pattern.to_string()).push(" ESCAPE '!'");
    if let Some(language) = language {
        qb.push(" AND language = ").push_bind(language.as_str());
    }
}

pub async fn quick(
    conn: &mut SqliteConnection,
    term: &str,
    language: Option<Language>,
    page: Page,
) -> sqlx::Result<(Vec<EntryMinimal>, i64)> {
    let pattern = contains_pattern(&term.to_lowercase());

    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM entries");
    push_quick_filter(&mut qb, &pattern, language);
    let count = qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

    let mut qb = QueryBuilder::new("SELECT id, lemma, description, language FROM entries");
    push_quick_filter(&mut qb, &pattern, language);
    qb.push(" ORDER BY lemma COLLATE NOCASE, id LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.skip);
    let entries = qb.build_query_as::<EntryMinimal>().fetch_all(&mut *conn).await?;
    Ok((entries, count))
}

// Every translated pair once, normalised to (english, slovene), plus each
// untranslated entry on its own side.
const PAIR_ROWS: &str = r#"
WITH pairs AS (
    SELECT DISTINCT
        CASE WHEN p.language = 'en' THEN t.parent ELSE t.child END AS en_id,
        CASE WHEN p.language = 'en' THEN t.child ELSE t.parent END AS sl_id
    FROM translations t
    JOIN entries p ON p.id = t.parent
),
candidates AS (
    SELECT en_id, sl_id FROM pairs
    UNION ALL
    SELECT e.id, NULL FROM entries e
    WHERE e.language = 'en' AND e.id NOT IN (SELECT en_id FROM pairs)
    UNION ALL
    SELECT NULL, e.id FROM entries e
    WHERE e.language = 'sl' AND e.id NOT IN (SELECT sl_id FROM pairs)
)
"#;

const PAIR_MATCH: &str = r#"
FROM candidates c
LEFT JOIN entries en ON en.id = c.en_id
LEFT JOIN entries sl ON sl.id = c.sl_id
WHERE en.lemma_folded LIKE ?1 ESCAPE '!'
   OR en.description_folded LIKE ?1 ESCAPE '!'
   OR sl.lemma_folded LIKE ?1 ESCAPE '!'
   OR sl.description_folded LIKE ?1 ESCAPE '!'
"#;

#[derive(Debug, FromRow)]
struct PairRow {
    en_id: Option<i64>,
    en_lemma: Option<String>,
    en_description: Option<String>,
    sl_id: Option<i64>,
    sl_lemma: Option<String>,
    sl_description: Option<String>,
}

fn side(id: Option<i64>, lemma: Option<String>, description: Option<String>, language: Language) -> Option<EntryMinimal> {
    Some(EntryMinimal { id: id?, lemma: lemma?, description, language: language.as_str().to_string() })
}

impl From<PairRow> for SearchPair {
    fn from(row: PairRow) -> Self {
        SearchPair {
            english: side(row.en_id, row.en_lemma, row.en_description, Language::English),
            slovene: side(row.sl_id, row.sl_lemma, row.sl_description, Language::Slovene),
        }
    }
}

/// Pairs where either side's lemma or description matches.
pub async fn full(conn: &mut SqliteConnection, term: &str, page: Page) -> sqlx::Result<(Vec<SearchPair>, i64)> {
    let pattern = contains_pattern(&term.to_lowercase());

    let count: i64 = sqlx::query_scalar(&format!("{PAIR_ROWS} SELECT COUNT(*) {PAIR_MATCH}"))
        .bind(&pattern)
        .fetch_one(&mut *conn)
        .await?;

    let rows = sqlx::query_as::<_, PairRow>(&format!(
        "{PAIR_ROWS}
         SELECT en.id AS en_id, en.lemma AS en_lemma, en.description AS en_description,
                sl.id AS sl_id, sl.lemma AS sl_lemma, sl.description AS sl_description
         {PAIR_MATCH}
         ORDER BY COALESCE(en.lemma, sl.lemma) COLLATE NOCASE, en.id, sl.id
         LIMIT ?2 OFFSET ?3"
    ))
    .bind(&pattern)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;

    Ok((rows.into_iter().map(SearchPair::from).collect(), count))
}

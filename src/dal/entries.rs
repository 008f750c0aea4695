//! Entries and everything attached to them: links, suggestions, translations,
//! relations and category memberships.

use sqlx::{FromRow, SqliteConnection};

use crate::pagination::Page;
use crate::types::{Category, Entry, EntryMinimal, EntryPair, EntryRow, Language, Link, TranslationState};

const ROW_COLUMNS: &str = "id, lemma, description, language, alt_form, created, modified";

/// Ordering for language listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntrySort {
    #[default]
    Lemma,
    Created,
    Modified,
}

impl EntrySort {
    /// `None` for an unrecognised value; a missing value means lemma order.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("lemma") | Some("alphabetical") => Some(EntrySort::Lemma),
            Some("created") => Some(EntrySort::Created),
            Some("modified") | Some("edits") => Some(EntrySort::Modified),
            Some(_) => None,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            EntrySort::Lemma => "lemma COLLATE NOCASE ASC, id ASC",
            EntrySort::Created => "created DESC, id DESC",
            EntrySort::Modified => "COALESCE(modified, created) DESC, id DESC",
        }
    }
}

#[derive(Debug, FromRow)]
struct TranslationRow {
    parent: i64,
    child: i64,
    state: Option<i64>,
}

pub async fn get_row(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Option<EntryRow>> {
    sqlx::query_as::<_, EntryRow>(&format!("SELECT {ROW_COLUMNS} FROM entries WHERE id = ?1"))
        .bind(entry_id)
        .fetch_optional(&mut *conn)
        .await
}

/// The entry's language, or `None` when it does not exist.
pub async fn language_of(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Option<Language>> {
    let language: Option<String> = sqlx::query_scalar("SELECT language FROM entries WHERE id = ?1")
        .bind(entry_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(language.and_then(|l| l.parse().ok()))
}

/// Also stores lowercased copies of the lemma and description for search.
pub async fn create_entry(
    conn: &mut SqliteConnection,
    lemma: &str,
    description: Option<&str>,
    language: Language,
    alt_form: Option<&str>,
) -> sqlx::Result<EntryRow> {
    let id = sqlx::query(
        "INSERT INTO entries (lemma, description, language, alt_form, lemma_folded, description_folded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(lemma)
    .bind(description)
    .bind(language.as_str())
    .bind(alt_form)
    .bind(lemma.to_lowercase())
    .bind(description.map(str::to_lowercase))
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    get_row(conn, id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Applies the provided fields and stamps `modified`. False when missing.
///
/// `description` and `alt_form` are `None` to leave them alone and
/// `Some(None)` to clear them.
pub async fn update_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
    lemma: Option<&str>,
    description: Option<Option<&str>>,
    alt_form: Option<Option<&str>>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE entries SET
            lemma = COALESCE(?2, lemma),
            lemma_folded = COALESCE(?3, lemma_folded),
            description = CASE WHEN ?4 THEN ?5 ELSE description END,
            description_folded = CASE WHEN ?4 THEN ?6 ELSE description_folded END,
            alt_form = CASE WHEN ?7 THEN ?8 ELSE alt_form END,
            modified = strftime('%Y-%m-%dT%H:%M:%SZ','now')
         WHERE id = ?1",
    )
    .bind(entry_id)
    .bind(lemma)
    .bind(lemma.map(str::to_lowercase))
    .bind(description.is_some())
    .bind(description.flatten())
    .bind(description.flatten().map(str::to_lowercase))
    .bind(alt_form.is_some())
    .bind(alt_form.flatten())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Links, memberships, suggestions, relations and translations cascade.
pub async fn delete_entry(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM entries WHERE id = ?1").bind(entry_id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

/// The entry with its suggestions, relations, links and categories.
pub async fn load_entry(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Option<Entry>> {
    let Some(row) = get_row(conn, entry_id).await? else {
        return Ok(None);
    };
    let mut entry = Entry::from(row);
    entry.suggestions = list_suggestions(conn, entry_id).await?;
    entry.relations = list_relations(conn, entry_id).await?;
    entry.links = list_links(conn, entry_id).await?;
    entry.categories = list_categories(conn, entry_id).await?;
    Ok(Some(entry))
}

/// The entry plus the entry it is translated to (or from) and the state label.
pub async fn get_pair(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Option<EntryPair>> {
    let Some(original) = load_entry(conn, entry_id).await? else {
        return Ok(None);
    };

    let mut link = sqlx::query_as::<_, TranslationRow>("SELECT parent, child, state FROM translations WHERE parent = ?1")
        .bind(entry_id)
        .fetch_optional(&mut *conn)
        .await?;
    if link.is_none() {
        link = sqlx::query_as::<_, TranslationRow>(
            "SELECT parent, child, state FROM translations WHERE child = ?1 ORDER BY parent LIMIT 1",
        )
        .bind(entry_id)
        .fetch_optional(&mut *conn)
        .await?;
    }

    let Some(link) = link else {
        return Ok(Some(EntryPair { original, translation: None, translation_state: None }));
    };
    let other = if link.parent == entry_id { link.child } else { link.parent };
    let translation = load_entry(conn, other).await?;
    let translation_state = match link.state {
        Some(state_id) => {
            sqlx::query_as::<_, TranslationState>("SELECT id, label FROM translation_states WHERE id = ?1")
                .bind(state_id)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => None,
    };
    Ok(Some(EntryPair { original, translation, translation_state }))
}

pub async fn list_by_language(
    conn: &mut SqliteConnection,
    language: Language,
    sort: EntrySort,
    page: Page,
) -> sqlx::Result<(Vec<EntryMinimal>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE language = ?1")
        .bind(language.as_str())
        .fetch_one(&mut *conn)
        .await?;
    let entries = sqlx::query_as::<_, EntryMinimal>(&format!(
        "SELECT id, lemma, description, language FROM entries WHERE language = ?1 ORDER BY {} LIMIT ?2 OFFSET ?3",
        sort.order_by()
    ))
    .bind(language.as_str())
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((entries, count))
}

// Links

pub async fn list_links(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Vec<Link>> {
    sqlx::query_as::<_, Link>("SELECT id, title, url, entry_id FROM links WHERE entry_id = ?1 ORDER BY id")
        .bind(entry_id)
        .fetch_all(&mut *conn)
        .await
}

pub async fn create_link(
    conn: &mut SqliteConnection,
    entry_id: i64,
    title: Option<&str>,
    url: &str,
) -> sqlx::Result<Link> {
    let id = sqlx::query("INSERT INTO links (title, url, entry_id) VALUES (?1, ?2, ?3)")
        .bind(title)
        .bind(url)
        .bind(entry_id)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    Ok(Link { id, title: title.map(str::to_string), url: url.to_string(), entry_id })
}

/// `None` when the link does not exist on this entry.
pub async fn update_link(
    conn: &mut SqliteConnection,
    entry_id: i64,
    link_id: i64,
    title: Option<&str>,
    url: Option<&str>,
) -> sqlx::Result<Option<Link>> {
    let result = sqlx::query(
        "UPDATE links SET title = COALESCE(?3, title), url = COALESCE(?4, url) WHERE id = ?2 AND entry_id = ?1",
    )
    .bind(entry_id)
    .bind(link_id)
    .bind(title)
    .bind(url)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    sqlx::query_as::<_, Link>("SELECT id, title, url, entry_id FROM links WHERE id = ?1")
        .bind(link_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn delete_link(conn: &mut SqliteConnection, entry_id: i64, link_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM links WHERE id = ?2 AND entry_id = ?1")
        .bind(entry_id)
        .bind(link_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Suggestions

pub async fn list_suggestions(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Vec<EntryMinimal>> {
    sqlx::query_as::<_, EntryMinimal>(
        "SELECT e.id, e.lemma, e.description, e.language FROM suggestions s
         JOIN entries e ON e.id = s.child
         WHERE s.parent = ?1
         ORDER BY e.lemma COLLATE NOCASE, e.id",
    )
    .bind(entry_id)
    .fetch_all(&mut *conn)
    .await
}

/// An existing pair surfaces as a unique violation.
pub async fn add_suggestion(conn: &mut SqliteConnection, parent: i64, child: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO suggestions (parent, child) VALUES (?1, ?2)")
        .bind(parent)
        .bind(child)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn remove_suggestion(conn: &mut SqliteConnection, parent: i64, child: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM suggestions WHERE parent = ?1 AND child = ?2")
        .bind(parent)
        .bind(child)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Translations

/// Links `parent` to `child`, dropping any translation either entry had on
/// either side, so each entry shows at most one translation.
pub async fn set_translation(
    conn: &mut SqliteConnection,
    parent: i64,
    child: i64,
    state: Option<i64>,
) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM translations WHERE parent IN (?1, ?2) OR child IN (?1, ?2)")
        .bind(parent)
        .bind(child)
        .execute(&mut *conn)
        .await?;
    sqlx::query("INSERT INTO translations (parent, child, state) VALUES (?1, ?2, ?3)")
        .bind(parent)
        .bind(child)
        .bind(state)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Removes the entry's translation whichever side it was created from.
pub async fn remove_translation(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM translations WHERE parent = ?1 OR child = ?1")
        .bind(entry_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Relations are symmetric: a row (a, b) relates b to a as well.

pub async fn list_relations(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Vec<EntryMinimal>> {
    sqlx::query_as::<_, EntryMinimal>(
        "SELECT e.id, e.lemma, e.description, e.language FROM relations r
         JOIN entries e ON e.id = CASE WHEN r.entry1 = ?1 THEN r.entry2 ELSE r.entry1 END
         WHERE r.entry1 = ?1 OR r.entry2 = ?1
         ORDER BY e.lemma COLLATE NOCASE, e.id",
    )
    .bind(entry_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn relation_exists(conn: &mut SqliteConnection, a: i64, b: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM relations WHERE (entry1 = ?1 AND entry2 = ?2) OR (entry1 = ?2 AND entry2 = ?1))",
    )
    .bind(a)
    .bind(b)
    .fetch_one(&mut *conn)
    .await
}

pub async fn add_relation(conn: &mut SqliteConnection, a: i64, b: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO relations (entry1, entry2) VALUES (?1, ?2)")
        .bind(a)
        .bind(b)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn remove_relation(conn: &mut SqliteConnection, a: i64, b: i64) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "DELETE FROM relations WHERE (entry1 = ?1 AND entry2 = ?2) OR (entry1 = ?2 AND entry2 = ?1)",
    )
    .bind(a)
    .bind(b)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

// Category membership

pub async fn list_categories(conn: &mut SqliteConnection, entry_id: i64) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT c.id, c.name, c.description FROM categories c
         JOIN category_to_entry ce ON ce.category_id = c.id
         WHERE ce.entry_id = ?1
         ORDER BY c.name COLLATE NOCASE, c.id",
    )
    .bind(entry_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn add_to_category(conn: &mut SqliteConnection, entry_id: i64, category_id: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO category_to_entry (entry_id, category_id) VALUES (?1, ?2)")
        .bind(entry_id)
        .bind(category_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn remove_from_category(
    conn: &mut SqliteConnection,
    entry_id: i64,
    category_id: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM category_to_entry WHERE entry_id = ?1 AND category_id = ?2")
        .bind(entry_id)
        .bind(category_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parsing() {
        assert_eq!(EntrySort::parse(None), Some(EntrySort::Lemma));
        assert_eq!(EntrySort::parse(Some("Created")), Some(EntrySort::Created));
        assert_eq!(EntrySort::parse(Some("edits")), Some(EntrySort::Modified));
        assert_eq!(EntrySort::parse(Some("random")), None);
    }
}

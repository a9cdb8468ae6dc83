use std::num::IntErrorKind;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, Select};

#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// Maps a raw `?page=` value onto `1..=num_pages`: anything unparsable or
/// below one is the first page, anything past the end is the last.
pub fn resolve_page(requested: Option<&str>, num_pages: u64) -> u64 {
    let last = num_pages.max(1);
    let Some(raw) = requested else { return 1 };
    match raw.trim().parse::<i64>() {
        Ok(n) if n > last as i64 => last,
        Ok(n) if n >= 1 => n as u64,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => last,
        _ => 1,
    }
}

pub async fn paginate<'db, C, E>(
    db: &'db C,
    select: Select<E>,
    requested: Option<&str>,
    per_page: u64,
) -> Result<Page<E::Model>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync + 'db,
{
    let paginator = select.paginate(db, per_page.max(1));
    let counts = paginator.num_items_and_pages().await?;
    let num_pages = counts.number_of_pages.max(1);
    let number = resolve_page(requested, num_pages);
    let items = paginator.fetch_page(number - 1).await?;

    Ok(Page { items, number, num_pages, total: counts.number_of_items })
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveModelTrait, QueryOrder, Set};

    use super::*;
    use crate::{entities::country, test_support};

    #[test]
    fn clamps_out_of_range_pages() {
        assert_eq!(resolve_page(None, 3), 1);
        assert_eq!(resolve_page(Some("0"), 3), 1);
        assert_eq!(resolve_page(Some("-4"), 3), 1);
        assert_eq!(resolve_page(Some("abc"), 3), 1);
        assert_eq!(resolve_page(Some("2"), 3), 2);
        assert_eq!(resolve_page(Some("99"), 3), 3);
        assert_eq!(resolve_page(Some("99"), 0), 1);
        assert_eq!(resolve_page(Some("99999999999999999999"), 3), 3);
        assert_eq!(resolve_page(Some("-99999999999999999999"), 3), 1);
    }

    #[tokio::test]
    async fn boundary_pages_match_their_neighbours() {
        let db = test_support::db().await;
        for name in ["A", "B", "C", "D", "E"] {
            country::ActiveModel { name: Set(name.to_string()), ..Default::default() }
                .insert(&db)
                .await
                .unwrap();
        }
        let select = || country::Entity::find().order_by_asc(country::Column::Name);
        let names = |page: Page<country::Model>| {
            page.items.into_iter().map(|c| c.name).collect::<Vec<_>>()
        };

        let first = paginate(&db, select(), Some("1"), 2).await.unwrap();
        assert_eq!(first.num_pages, 3);
        assert_eq!(first.total, 5);
        assert!(!first.has_previous() && first.has_next());
        let zero = paginate(&db, select(), Some("0"), 2).await.unwrap();
        assert_eq!(names(zero), names(first));

        let last = paginate(&db, select(), Some("3"), 2).await.unwrap();
        let beyond = paginate(&db, select(), Some("42"), 2).await.unwrap();
        assert_eq!(beyond.number, 3);
        assert_eq!(names(beyond), vec!["E".to_string()]);
        assert_eq!(names(last), vec!["E".to_string()]);
    }

    #[tokio::test]
    async fn empty_set_has_one_page() {
        let db = test_support::db().await;
        let page = paginate(&db, country::Entity::find(), Some("5"), 10).await.unwrap();
        assert_eq!((page.number, page.num_pages, page.total), (1, 1, 0));
        assert!(page.items.is_empty());
    }
}

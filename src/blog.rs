use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::{
    entities::{comment, post, section, user},
    error::{AppError, AppResult, SaveResult},
    forms::{
        FieldErrors,
        blog::{CommentInput, PostInput, SectionChange, SectionInput, slugify},
    },
    pagination::{Page, paginate},
    search,
};

#[derive(Clone, Debug)]
pub struct PostSummary {
    pub post: post::Model,
    pub author: String,
}

#[derive(Clone, Debug)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: String,
}

#[derive(Clone, Debug)]
pub struct PostDetail {
    pub post: post::Model,
    pub author: String,
    pub sections: Vec<section::Model>,
    pub comments: Vec<CommentView>,
}

/// Store for posts, their ordered sections and comments.
#[derive(Clone)]
pub struct Blog {
    db: DatabaseConnection,
    page_size: u64,
}

impl Blog {
    pub fn new(db: DatabaseConnection, page_size: u64) -> Self {
        Self { db, page_size }
    }

    pub async fn posts(&self, query: Option<&str>, page: Option<&str>) -> AppResult<Page<PostSummary>> {
        let mut select = post::Entity::find()
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id);
        if let Some(term) = query.map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(search::contains((post::Entity, post::Column::Name), term));
        }
        let page = paginate(&self.db, select, page, self.page_size).await?;

        let author_ids: Vec<i32> = page.items.iter().map(|p| p.author_id).collect();
        let authors: HashMap<i32, String> = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(page.map(|post| {
            let author = authors.get(&post.author_id).cloned().unwrap_or_default();
            PostSummary { post, author }
        }))
    }

    pub async fn post(&self, id: i32) -> AppResult<post::Model> {
        post::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Post"))
    }

    pub async fn post_detail(&self, id: i32) -> AppResult<PostDetail> {
        let post = self.post(id).await?;
        let (author, sections, comments) = futures::try_join!(
            user::Entity::find_by_id(post.author_id).one(&self.db),
            sections_of(&self.db, post.id),
            comment::Entity::find()
                .filter(comment::Column::PostId.eq(post.id))
                .find_also_related(user::Entity)
                .order_by_asc(comment::Column::CreatedAt)
                .order_by_asc(comment::Column::Id)
                .all(&self.db),
        )?;

        let comments = comments
            .into_iter()
            .map(|(comment, author)| CommentView {
                comment,
                author: author.map(|u| u.username).unwrap_or_default(),
            })
            .collect();

        Ok(PostDetail {
            post,
            author: author.map(|u| u.username).unwrap_or_default(),
            sections,
            comments,
        })
    }

    /// Sections in display order.
    pub async fn sections(&self, post: &post::Model) -> AppResult<Vec<section::Model>> {
        Ok(sections_of(&self.db, post.id).await?)
    }

    /// Inserts the post and every section, or nothing at all.
    pub async fn create_post(
        &self,
        author_id: i32,
        input: PostInput,
        changes: Vec<SectionChange>,
    ) -> SaveResult<post::Model> {
        let txn = self.db.begin().await?;

        let post = post::ActiveModel {
            slug: Set(slugify(&input.name)),
            name: Set(input.name),
            icon: Set(input.icon),
            author_id: Set(author_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let counts = apply_section_changes(&txn, post.id, changes).await?;
        txn.commit().await?;

        info!(post_id = post.id, author_id, sections = counts.inserted, "post created");
        Ok(post)
    }

    /// Saves the post and applies the section diff in one transaction.
    /// Sections the diff does not mention are left as they are.
    pub async fn update_post(
        &self,
        post: post::Model,
        input: PostInput,
        changes: Vec<SectionChange>,
    ) -> SaveResult<post::Model> {
        let txn = self.db.begin().await?;

        let mut model: post::ActiveModel = post.into();
        model.slug = Set(slugify(&input.name));
        model.name = Set(input.name);
        model.icon = Set(input.icon);
        let post = model.update(&txn).await?;

        let counts = apply_section_changes(&txn, post.id, changes).await?;
        txn.commit().await?;

        info!(
            post_id = post.id,
            inserted = counts.inserted,
            updated = counts.updated,
            deleted = counts.deleted,
            "post updated"
        );
        Ok(post)
    }

    /// Sections and comments go with the post.
    pub async fn delete_post(&self, post: post::Model) -> AppResult<()> {
        let id = post.id;
        post.delete(&self.db).await?;
        info!(post_id = id, "post deleted");
        Ok(())
    }

    pub async fn add_comment(
        &self,
        post: &post::Model,
        author_id: i32,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let comment = comment::ActiveModel {
            post_id: Set(post.id),
            author_id: Set(author_id),
            body: Set(input.body),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(comment_id = comment.id, post_id = post.id, author_id, "comment added");
        Ok(comment)
    }

    /// The comment, provided it belongs to `post_id`.
    pub async fn comment(&self, post_id: i32, comment_id: i32) -> AppResult<comment::Model> {
        comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Comment"))
    }

    pub async fn update_comment(
        &self,
        comment: comment::Model,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let mut model: comment::ActiveModel = comment.into();
        model.body = Set(input.body);
        let comment = model.update(&self.db).await?;

        info!(comment_id = comment.id, post_id = comment.post_id, "comment updated");
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment: comment::Model) -> AppResult<()> {
        let (id, post_id) = (comment.id, comment.post_id);
        comment.delete(&self.db).await?;
        info!(comment_id = id, post_id, "comment deleted");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ChangeCounts {
    inserted: usize,
    updated: usize,
    deleted: usize,
}

async fn sections_of<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<Vec<section::Model>, sea_orm::DbErr> {
    section::Entity::find()
        .filter(section::Column::PostId.eq(post_id))
        .order_by_asc(section::Column::Position)
        .order_by_asc(section::Column::Id)
        .all(db)
        .await
}

/// Every id the diff refers to must name a section of `post_id`; otherwise
/// nothing is written and the caller's transaction is dropped.
async fn apply_section_changes<C: ConnectionTrait>(
    txn: &C,
    post_id: i32,
    changes: Vec<SectionChange>,
) -> SaveResult<ChangeCounts> {
    let mut existing: HashMap<i32, section::Model> =
        sections_of(txn, post_id).await?.into_iter().map(|s| (s.id, s)).collect();

    let mut errors = FieldErrors::new();
    for change in &changes {
        if let SectionChange::Update(id, _) | SectionChange::Delete(id) = change {
            if !existing.contains_key(id) {
                errors.add_general(format!("Section {id} does not belong to this post."));
            }
        }
    }
    errors.into_result(())?;

    let mut counts = ChangeCounts::default();
    for change in changes {
        match change {
            SectionChange::Insert(input) => {
                let mut model = section::ActiveModel { post_id: Set(post_id), ..Default::default() };
                fill_section(&mut model, input);
                model.insert(txn).await?;
                counts.inserted += 1;
            },
            SectionChange::Update(id, input) => {
                if let Some(section) = existing.remove(&id) {
                    let mut model: section::ActiveModel = section.into();
                    fill_section(&mut model, input);
                    model.update(txn).await?;
                    counts.updated += 1;
                }
            },
            SectionChange::Delete(id) => {
                section::Entity::delete_by_id(id).exec(txn).await?;
                counts.deleted += 1;
            },
        }
    }

    debug!(post_id, ?counts, "section changes applied");
    Ok(counts)
}

fn fill_section(model: &mut section::ActiveModel, input: SectionInput) {
    model.name = Set(input.name);
    model.body = Set(input.body);
    model.position = Set(input.position);
    model.image = Set(input.image);
    model.image_position = Set(input.image_position.as_code().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SaveError, models::ImagePosition, test_support};

    fn section(name: &str, position: i32) -> SectionInput {
        SectionInput {
            name: name.to_string(),
            body: format!("About {name}."),
            position,
            image: None,
            image_position: ImagePosition::default(),
        }
    }

    fn post_input(name: &str) -> PostInput {
        PostInput { name: name.to_string(), icon: None }
    }

    async fn count_posts(db: &DatabaseConnection) -> usize {
        post::Entity::find().all(db).await.unwrap().len()
    }

    async fn count_sections(db: &DatabaseConnection) -> usize {
        section::Entity::find().all(db).await.unwrap().len()
    }

    #[tokio::test]
    async fn create_inserts_sections_in_position_order() {
        let db = test_support::db().await;
        let author = test_support::user(&db, "writer", false).await;
        let blog = Blog::new(db.clone(), 10);

        let changes = vec![
            SectionChange::Insert(section("third", 30)),
            SectionChange::Insert(section("first", 10)),
            SectionChange::Insert(section("second", 20)),
        ];
        let post = blog.create_post(author.id, post_input("Summer Reading List"), changes).await.unwrap();
        assert_eq!(post.slug, "summer-reading-list");
        assert_eq!(post.author_id, author.id);

        let detail = blog.post_detail(post.id).await.unwrap();
        assert_eq!(detail.author, "writer");
        let names: Vec<_> = detail.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(detail.sections[0].image_position, "BT");
    }

    #[tokio::test]
    async fn create_with_foreign_section_id_leaves_nothing() {
        let db = test_support::db().await;
        let author = test_support::user(&db, "writer", false).await;
        let blog = Blog::new(db.clone(), 10);

        let changes = vec![SectionChange::Insert(section("intro", 1)), SectionChange::Update(77, section("x", 2))];
        let err = blog.create_post(author.id, post_input("Doomed"), changes).await.unwrap_err();
        assert!(matches!(err, SaveError::Invalid(ref e) if e.general().len() == 1));
        assert_eq!(count_posts(&db).await, 0);
        assert_eq!(count_sections(&db).await, 0);
    }

    #[tokio::test]
    async fn update_applies_the_diff_and_leaves_the_rest() {
        let db = test_support::db().await;
        let author = test_support::user(&db, "writer", false).await;
        let blog = Blog::new(db.clone(), 10);

        let post = blog
            .create_post(
                author.id,
                post_input("Draft"),
                vec![
                    SectionChange::Insert(section("keep", 1)),
                    SectionChange::Insert(section("edit", 2)),
                    SectionChange::Insert(section("drop", 3)),
                ],
            )
            .await
            .unwrap();
        let sections = blog.sections(&post).await.unwrap();
        let (keep, edit, drop) = (&sections[0], &sections[1], &sections[2]);

        let post = blog
            .update_post(
                post,
                post_input("Final Cut"),
                vec![
                    SectionChange::Update(edit.id, section("edited", 0)),
                    SectionChange::Delete(drop.id),
                    SectionChange::Insert(section("new", 5)),
                ],
            )
            .await
            .unwrap();
        assert_eq!(post.slug, "final-cut");

        let after = blog.sections(&post).await.unwrap();
        let names: Vec<_> = after.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["edited", "keep", "new"]);
        assert_eq!(after[0].id, edit.id);
        assert_eq!(after[1], *keep);
    }

    #[tokio::test]
    async fn update_with_unknown_section_rolls_back() {
        let db = test_support::db().await;
        let author = test_support::user(&db, "writer", false).await;
        let blog = Blog::new(db.clone(), 10);

        let mine = blog
            .create_post(author.id, post_input("Mine"), vec![SectionChange::Insert(section("a", 1))])
            .await
            .unwrap();
        let other = blog
            .create_post(author.id, post_input("Other"), vec![SectionChange::Insert(section("b", 1))])
            .await
            .unwrap();
        let foreign = blog.sections(&other).await.unwrap().remove(0);

        let err = blog
            .update_post(
                mine.clone(),
                post_input("Renamed"),
                vec![SectionChange::Insert(section("c", 2)), SectionChange::Delete(foreign.id)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));

        assert_eq!(blog.post(mine.id).await.unwrap().name, "Mine");
        assert_eq!(blog.sections(&mine).await.unwrap().len(), 1);
        assert_eq!(blog.sections(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn comments_belong_to_their_post() {
        let db = test_support::db().await;
        let author = test_support::user(&db, "writer", false).await;
        let reader = test_support::user(&db, "reader", false).await;
        let blog = Blog::new(db.clone(), 10);
        let first = blog.create_post(author.id, post_input("First"), vec![]).await.unwrap();
        let second = blog.create_post(author.id, post_input("Second"), vec![]).await.unwrap();

        let comment = blog
            .add_comment(&first, reader.id, CommentInput { body: "Nice".to_string() })
            .await
            .unwrap();
        assert!(blog.comment(first.id, comment.id).await.is_ok());
        assert!(matches!(blog.comment(second.id, comment.id).await, Err(AppError::NotFound(_))));

        let detail = blog.post_detail(first.id).await.unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].author, "reader");

        blog.delete_post(first).await.unwrap();
        assert!(comment::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_search_filters_by_title() {
        let db = test_support::db().await;
        let author = test_support::user(&db, "writer", false).await;
        let blog = Blog::new(db.clone(), 10);
        for name in ["Rust in Production", "Gardening", "Trusty Tools"] {
            blog.create_post(author.id, post_input(name), vec![]).await.unwrap();
        }

        let page = blog.posts(Some("rust"), None).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|s| s.post.name.as_str()).collect();
        assert_eq!(names, ["Rust in Production", "Trusty Tools"]);
        assert_eq!(page.items[0].author, "writer");
    }
}

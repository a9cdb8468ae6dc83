use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240301_000001_create_user::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(pk_auto(Post::Id))
                    .col(string_len(Post::Name, 250))
                    .col(string_len(Post::Slug, 250))
                    .col(string_null(Post::Icon))
                    .col(integer(Post::AuthorId))
                    .col(big_integer(Post::CreatedAt))
                    .col(big_integer(Post::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author")
                            .from(Post::Table, Post::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Section::Table)
                    .if_not_exists()
                    .col(pk_auto(Section::Id))
                    .col(integer(Section::PostId))
                    .col(string_len(Section::Name, 250))
                    .col(text(Section::Body))
                    .col(integer(Section::Position))
                    .col(string_null(Section::Image))
                    .col(string_len(Section::ImagePosition, 2).default("BT"))
                    .col(big_integer(Section::CreatedAt))
                    .col(big_integer(Section::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_section_post")
                            .from(Section::Table, Section::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_section_post_position")
                    .table(Section::Table)
                    .col(Section::PostId)
                    .col(Section::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(pk_auto(Comment::Id))
                    .col(integer(Comment::PostId))
                    .col(integer(Comment::AuthorId))
                    .col(text(Comment::Body))
                    .col(big_integer(Comment::CreatedAt))
                    .col(big_integer(Comment::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_post")
                            .from(Comment::Table, Comment::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_author")
                            .from(Comment::Table, Comment::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_post")
                    .table(Comment::Table)
                    .col(Comment::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Section::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Post::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Post {
    Table,
    Id,
    Name,
    Slug,
    Icon,
    AuthorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Section {
    Table,
    Id,
    PostId,
    Name,
    Body,
    Position,
    Image,
    ImagePosition,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comment {
    Table,
    Id,
    PostId,
    AuthorId,
    Body,
    CreatedAt,
    UpdatedAt,
}

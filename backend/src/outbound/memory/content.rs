//! Reviews and comments.

use async_trait::async_trait;
use pagination::PageRequest;

use super::{CommentRow, InMemoryStore, ReviewRow, Tables, paginate};
use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, Listing, ReviewRepository, ReviewRepositoryError,
};
use crate::domain::{
    Comment, CommentId, ContentText, NewComment, NewReview, Review, ReviewChanges, ReviewId,
    TitleId, UserId,
};

impl Tables {
    fn assemble_review(&self, id: i64, row: &ReviewRow) -> Option<Review> {
        Some(Review {
            id: ReviewId::new(id),
            title_id: TitleId::new(row.title_id),
            author_id: row.author_id,
            author: self.username_of(row.author_id)?,
            text: row.text.clone(),
            score: row.score,
            pub_date: row.pub_date,
        })
    }

    fn assemble_comment(&self, id: i64, row: &CommentRow) -> Option<Comment> {
        Some(Comment {
            id: CommentId::new(id),
            review_id: ReviewId::new(row.review_id),
            author_id: row.author_id,
            author: self.username_of(row.author_id)?,
            text: row.text.clone(),
            pub_date: row.pub_date,
        })
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn list(
        &self,
        title: TitleId,
        page: PageRequest,
    ) -> Result<Listing<Review>, ReviewRepositoryError> {
        let tables = self.tables().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|(_, row)| row.title_id == title.get())
            .filter_map(|(id, row)| tables.assemble_review(*id, row))
            .collect();
        reviews.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(reviews, page))
    }

    async fn find(
        &self,
        title: TitleId,
        id: ReviewId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .reviews
            .get(&id.get())
            .filter(|row| row.title_id == title.get())
            .and_then(|row| tables.assemble_review(id.get(), row)))
    }

    async fn find_by_author(
        &self,
        title: TitleId,
        author: UserId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .reviews
            .iter()
            .find(|(_, row)| row.title_id == title.get() && row.author_id == author)
            .and_then(|(id, row)| tables.assemble_review(*id, row)))
    }

    async fn insert(&self, review: &NewReview) -> Result<Review, ReviewRepositoryError> {
        let mut tables = self.tables().await;
        if !tables.titles.contains_key(&review.title_id.get()) {
            return Err(ReviewRepositoryError::query(format!(
                "title {} does not exist",
                review.title_id
            )));
        }
        let duplicate = tables.reviews.values().any(|row| {
            row.title_id == review.title_id.get() && row.author_id == review.author_id
        });
        if duplicate {
            return Err(ReviewRepositoryError::duplicate_review());
        }
        let id = tables.review_ids.next();
        let row = ReviewRow {
            title_id: review.title_id.get(),
            author_id: review.author_id,
            text: review.text.clone(),
            score: review.score,
            pub_date: review.pub_date,
        };
        let created = tables
            .assemble_review(id, &row)
            .ok_or_else(|| ReviewRepositoryError::query("review author does not exist"))?;
        tables.reviews.insert(id, row);
        Ok(created)
    }

    async fn update(
        &self,
        id: ReviewId,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut tables = self.tables().await;
        let Some(row) = tables.reviews.get_mut(&id.get()) else {
            return Ok(None);
        };
        if let Some(text) = &changes.text {
            row.text = text.clone();
        }
        if let Some(score) = changes.score {
            row.score = score;
        }
        let row = row.clone();
        Ok(tables.assemble_review(id.get(), &row))
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewRepositoryError> {
        Ok(self.tables().await.drop_review(id.get()))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list(
        &self,
        review: ReviewId,
        page: PageRequest,
    ) -> Result<Listing<Comment>, CommentRepositoryError> {
        let tables = self.tables().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|(_, row)| row.review_id == review.get())
            .filter_map(|(id, row)| tables.assemble_comment(*id, row))
            .collect();
        comments.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(comments, page))
    }

    async fn find(
        &self,
        review: ReviewId,
        id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .comments
            .get(&id.get())
            .filter(|row| row.review_id == review.get())
            .and_then(|row| tables.assemble_comment(id.get(), row)))
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut tables = self.tables().await;
        if !tables.reviews.contains_key(&comment.review_id.get()) {
            return Err(CommentRepositoryError::query(format!(
                "review {} does not exist",
                comment.review_id
            )));
        }
        let id = tables.comment_ids.next();
        let row = CommentRow {
            review_id: comment.review_id.get(),
            author_id: comment.author_id,
            text: comment.text.clone(),
            pub_date: comment.pub_date,
        };
        let created = tables
            .assemble_comment(id, &row)
            .ok_or_else(|| CommentRepositoryError::query("comment author does not exist"))?;
        tables.comments.insert(id, row);
        Ok(created)
    }

    async fn update(
        &self,
        id: CommentId,
        text: &ContentText,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut tables = self.tables().await;
        let Some(row) = tables.comments.get_mut(&id.get()) else {
            return Ok(None);
        };
        row.text = text.clone();
        let row = row.clone();
        Ok(tables.assemble_comment(id.get(), &row))
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError> {
        Ok(self.tables().await.comments.remove(&id.get()).is_some())
    }
}

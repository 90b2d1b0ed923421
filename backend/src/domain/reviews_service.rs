//! Review and comment use-cases.
//!
//! Reviews live under a title and comments under a review; every lookup is
//! scoped by its parent so a review id paired with the wrong title is
//! reported as missing. Authors may change their own content, moderators
//! and admins anyone's.

use std::sync::Arc;

use mockable::Clock;
use pagination::PageRequest;
use tracing::info;

use crate::domain::ports::{CommentRepository, Listing, ReviewRepository, TitleRepository};
use crate::domain::{
    Actor, Capability, Comment, CommentId, ContentText, Error, NewComment, NewReview, Review,
    ReviewChanges, ReviewId, Score, TitleId,
};

/// Review and comment service.
#[derive(Clone)]
pub struct ReviewsService {
    titles: Arc<dyn TitleRepository>,
    reviews: Arc<dyn ReviewRepository>,
    comments: Arc<dyn CommentRepository>,
    clock: Arc<dyn Clock>,
}

impl ReviewsService {
    /// Create a new service with the given collaborators.
    pub fn new(
        titles: Arc<dyn TitleRepository>,
        reviews: Arc<dyn ReviewRepository>,
        comments: Arc<dyn CommentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            titles,
            reviews,
            comments,
            clock,
        }
    }

    /// List a title's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Unknown titles yield `not_found`.
    pub async fn list_reviews(
        &self,
        title: TitleId,
        page: PageRequest,
    ) -> Result<Listing<Review>, Error> {
        self.ensure_title(title).await?;
        Ok(self.reviews.list(title, page).await?)
    }

    /// Fetch one review of a title.
    ///
    /// # Errors
    ///
    /// Unknown titles or reviews yield `not_found`.
    pub async fn get_review(&self, title: TitleId, id: ReviewId) -> Result<Review, Error> {
        self.reviews
            .find(title, id)
            .await?
            .ok_or_else(|| Self::missing_review(id))
    }

    /// Post a review. Each user may review a title once.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::AuthorContent`]; unknown titles yield
    /// `not_found`; a second review by the same author is a validation
    /// error.
    pub async fn create_review(
        &self,
        actor: &Actor,
        title: TitleId,
        text: ContentText,
        score: Score,
    ) -> Result<Review, Error> {
        let author = actor.require_user(Capability::AuthorContent)?;
        self.ensure_title(title).await?;
        if self.reviews.find_by_author(title, author.id()).await?.is_some() {
            return Err(Error::field(
                "non_field_errors",
                "you have already reviewed this title",
            ));
        }

        let review = self
            .reviews
            .insert(&NewReview {
                title_id: title,
                author_id: author.id(),
                text,
                score,
                pub_date: self.clock.utc(),
            })
            .await?;
        info!(title = %title, review = %review.id, author = %author.username(), "review posted");
        Ok(review)
    }

    /// Edit a review's text or score.
    ///
    /// # Errors
    ///
    /// Only the author, moderators and admins may edit; unknown reviews
    /// yield `not_found`.
    pub async fn update_review(
        &self,
        actor: &Actor,
        title: TitleId,
        id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review, Error> {
        let review = self.get_review(title, id).await?;
        actor.require_owner_or_moderator(review.author_id)?;
        self.reviews
            .update(id, &changes)
            .await?
            .ok_or_else(|| Self::missing_review(id))
    }

    /// Delete a review and its comments.
    ///
    /// # Errors
    ///
    /// Only the author, moderators and admins may delete; unknown reviews
    /// yield `not_found`.
    pub async fn delete_review(
        &self,
        actor: &Actor,
        title: TitleId,
        id: ReviewId,
    ) -> Result<(), Error> {
        let review = self.get_review(title, id).await?;
        let actor_user = actor.require_owner_or_moderator(review.author_id)?;
        if !self.reviews.delete(id).await? {
            return Err(Self::missing_review(id));
        }
        info!(title = %title, review = %id, by = %actor_user.username(), "review deleted");
        Ok(())
    }

    /// List a review's comments, newest first.
    ///
    /// # Errors
    ///
    /// Unknown reviews, or reviews of a different title, yield `not_found`.
    pub async fn list_comments(
        &self,
        title: TitleId,
        review: ReviewId,
        page: PageRequest,
    ) -> Result<Listing<Comment>, Error> {
        self.get_review(title, review).await?;
        Ok(self.comments.list(review, page).await?)
    }

    /// Fetch one comment.
    ///
    /// # Errors
    ///
    /// Unknown parents or comments yield `not_found`.
    pub async fn get_comment(
        &self,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<Comment, Error> {
        self.get_review(title, review).await?;
        self.comments
            .find(review, id)
            .await?
            .ok_or_else(|| Self::missing_comment(id))
    }

    /// Comment on a review.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::AuthorContent`]; unknown parents yield
    /// `not_found`.
    pub async fn create_comment(
        &self,
        actor: &Actor,
        title: TitleId,
        review: ReviewId,
        text: ContentText,
    ) -> Result<Comment, Error> {
        let author = actor.require_user(Capability::AuthorContent)?;
        self.get_review(title, review).await?;
        let comment = self
            .comments
            .insert(&NewComment {
                review_id: review,
                author_id: author.id(),
                text,
                pub_date: self.clock.utc(),
            })
            .await?;
        info!(
            review = %review,
            comment = %comment.id,
            author = %author.username(),
            "comment posted"
        );
        Ok(comment)
    }

    /// Replace a comment's text.
    ///
    /// # Errors
    ///
    /// Only the author, moderators and admins may edit; unknown comments
    /// yield `not_found`.
    pub async fn update_comment(
        &self,
        actor: &Actor,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
        text: ContentText,
    ) -> Result<Comment, Error> {
        let comment = self.get_comment(title, review, id).await?;
        actor.require_owner_or_moderator(comment.author_id)?;
        self.comments
            .update(id, &text)
            .await?
            .ok_or_else(|| Self::missing_comment(id))
    }

    /// Delete a comment.
    ///
    /// # Errors
    ///
    /// Only the author, moderators and admins may delete; unknown comments
    /// yield `not_found`.
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        title: TitleId,
        review: ReviewId,
        id: CommentId,
    ) -> Result<(), Error> {
        let comment = self.get_comment(title, review, id).await?;
        actor.require_owner_or_moderator(comment.author_id)?;
        if !self.comments.delete(id).await? {
            return Err(Self::missing_comment(id));
        }
        Ok(())
    }

    async fn ensure_title(&self, title: TitleId) -> Result<(), Error> {
        match self.titles.find(title).await? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("title {title} not found"))),
        }
    }

    fn missing_review(id: ReviewId) -> Error {
        Error::not_found(format!("review {id} not found"))
    }

    fn missing_comment(id: CommentId) -> Error {
        Error::not_found(format!("comment {id} not found"))
    }
}

#[cfg(test)]
#[path = "reviews_service_tests.rs"]
mod tests;

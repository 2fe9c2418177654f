use async_trait::async_trait;
use std::sync::Mutex;
use time::OffsetDateTime;

use crate::db::{
    artist_repository::ArtistRepository, booking_repository::BookingRepository,
    portfolio_repository::PortfolioRepository, review_repository::ReviewRepository,
    user_repository::UserRepository,
};
use crate::models::{
    artist::{Artist, ArtistAnalytics, ArtistProfilePayload, ArtistSearchQuery, TierChange},
    booking::{Booking, BookingStatus, NewBooking},
    portfolio::{NewPortfolioImage, PortfolioImage},
    review::{NewReview, Review},
    user::PublicUser,
};

/// In-memory store implementing every repository trait. State mutations are
/// applied for real so tests can assert final state, and write calls are
/// recorded so tests can assert what happened.
#[derive(Default)]
#[allow(dead_code)]
pub struct MockDb {
    pub bookings: Mutex<Vec<Booking>>,
    pub artists: Mutex<Vec<Artist>>,
    pub images: Mutex<Vec<PortfolioImage>>,
    pub reviews: Mutex<Vec<Review>>,
    pub users: Mutex<Vec<PublicUser>>,
    pub should_fail: bool,
    pub confirm_deposit_calls: Mutex<Vec<(i64, String, i64)>>,
    pub status_updates: Mutex<Vec<(i64, BookingStatus)>>,
    pub tier_changes: Mutex<Vec<TierChange>>,
    pub checkout_sessions: Mutex<Vec<(i64, String)>>,
    next_id: Mutex<i64>,
}

#[allow(dead_code)]
impl MockDb {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_booking(self, booking: Booking) -> Self {
        self.bookings.lock().unwrap().push(booking);
        self
    }

    pub fn with_artist(self, artist: Artist) -> Self {
        self.artists.lock().unwrap().push(artist);
        self
    }

    pub fn with_image(self, image: PortfolioImage) -> Self {
        self.images.lock().unwrap().push(image);
        self
    }

    pub fn with_review(self, review: Review) -> Self {
        self.reviews.lock().unwrap().push(review);
        self
    }

    pub fn with_user(self, user: PublicUser) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    fn fail_check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }

    fn alloc_id(&self) -> i64 {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        *guard + 1000
    }

    fn sort_featured_first(artists: &mut [Artist]) {
        use crate::models::artist::SubscriptionTier;
        artists.sort_by(|a, b| {
            let a_premium = a.subscription_tier == SubscriptionTier::Premium;
            let b_premium = b.subscription_tier == SubscriptionTier::Premium;
            b_premium.cmp(&a_premium).then(
                b.average_rating
                    .unwrap_or(0.0)
                    .total_cmp(&a.average_rating.unwrap_or(0.0)),
            )
        });
    }
}

#[async_trait]
impl BookingRepository for MockDb {
    async fn create_booking(
        &self,
        booking: &NewBooking,
        user_id: Option<i64>,
    ) -> Result<Booking, sqlx::Error> {
        self.fail_check()?;
        let created = Booking {
            id: self.alloc_id(),
            artist_id: booking.artist_id,
            user_id,
            customer_name: booking.customer_name.trim().to_string(),
            customer_email: booking.customer_email.trim().to_string(),
            customer_phone: booking.customer_phone.trim().to_string(),
            preferred_date: booking.preferred_date,
            tattoo_description: booking.tattoo_description.trim().to_string(),
            placement: booking.placement.trim().to_string(),
            size: booking.size,
            budget: booking.budget.clone(),
            notes: booking.notes.clone(),
            stripe_checkout_session_id: None,
            stripe_payment_intent_id: None,
            deposit_amount: None,
            deposit_paid: false,
            status: BookingStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        self.bookings.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_booking_by_id(&self, id: i64) -> Result<Option<Booking>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn list_bookings_for_artist(&self, artist_id: i64) -> Result<Vec<Booking>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.artist_id == artist_id)
            .cloned()
            .collect())
    }

    async fn list_bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn set_checkout_session(&self, id: i64, session_id: &str) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.checkout_sessions
            .lock()
            .unwrap()
            .push((id, session_id.to_string()));
        if let Some(b) = self.bookings.lock().unwrap().iter_mut().find(|b| b.id == id) {
            b.stripe_checkout_session_id = Some(session_id.to_string());
        }
        Ok(())
    }

    async fn confirm_deposit(
        &self,
        id: i64,
        payment_intent_id: &str,
        amount: i64,
    ) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.confirm_deposit_calls
            .lock()
            .unwrap()
            .push((id, payment_intent_id.to_string(), amount));
        if let Some(b) = self.bookings.lock().unwrap().iter_mut().find(|b| b.id == id) {
            b.status = BookingStatus::Confirmed;
            b.deposit_paid = true;
            b.deposit_amount = Some(amount);
            b.stripe_payment_intent_id = Some(payment_intent_id.to_string());
        }
        Ok(())
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.status_updates.lock().unwrap().push((id, status));
        if let Some(b) = self.bookings.lock().unwrap().iter_mut().find(|b| b.id == id) {
            b.status = status;
        }
        Ok(())
    }
}

#[async_trait]
impl ArtistRepository for MockDb {
    async fn create_artist(
        &self,
        user_id: i64,
        profile: &ArtistProfilePayload,
    ) -> Result<Artist, sqlx::Error> {
        use crate::models::artist::SubscriptionTier;
        self.fail_check()?;
        let created = Artist {
            id: self.alloc_id(),
            user_id,
            shop_name: profile.shop_name.trim().to_string(),
            bio: profile.bio.clone(),
            specialties: profile.specialties.clone(),
            styles: profile.styles.clone(),
            years_experience: profile.years_experience,
            address: profile.address.clone(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            zip: profile.zip.clone(),
            phone: profile.phone.clone(),
            website: profile.website.clone(),
            instagram: profile.instagram.clone(),
            is_approved: false,
            average_rating: None,
            total_reviews: 0,
            subscription_tier: SubscriptionTier::Free,
            stripe_subscription_id: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.artists.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_artist_by_id(&self, id: i64) -> Result<Option<Artist>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .artists
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_artist_by_user_id(&self, user_id: i64) -> Result<Option<Artist>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .artists
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn find_artist_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Artist>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .artists
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.stripe_subscription_id.as_deref() == Some(subscription_id))
            .cloned())
    }

    async fn list_approved_artists(&self) -> Result<Vec<Artist>, sqlx::Error> {
        self.fail_check()?;
        let mut rows: Vec<Artist> = self
            .artists
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_approved)
            .cloned()
            .collect();
        Self::sort_featured_first(&mut rows);
        Ok(rows)
    }

    async fn search_artists(&self, query: &ArtistSearchQuery) -> Result<Vec<Artist>, sqlx::Error> {
        self.fail_check()?;
        let mut rows: Vec<Artist> = self
            .artists
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_approved)
            .filter(|a| match query.style.as_deref() {
                Some(style) => a
                    .styles
                    .as_deref()
                    .is_some_and(|styles| styles.iter().any(|s| s == style)),
                None => true,
            })
            .filter(|a| match query.city.as_deref() {
                Some(city) => a
                    .city
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(city)),
                None => true,
            })
            .filter(|a| match query.min_rating {
                Some(min) => a.average_rating.is_some_and(|r| r >= min),
                None => true,
            })
            .filter(|a| match query.min_experience {
                Some(min) => a.years_experience.is_some_and(|y| y >= min),
                None => true,
            })
            .cloned()
            .collect();
        Self::sort_featured_first(&mut rows);
        Ok(rows)
    }

    async fn update_artist_profile(
        &self,
        id: i64,
        profile: &ArtistProfilePayload,
    ) -> Result<Artist, sqlx::Error> {
        self.fail_check()?;
        let mut guard = self.artists.lock().unwrap();
        let artist = guard
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(sqlx::Error::RowNotFound)?;
        artist.shop_name = profile.shop_name.trim().to_string();
        artist.bio = profile.bio.clone();
        artist.specialties = profile.specialties.clone();
        artist.styles = profile.styles.clone();
        artist.years_experience = profile.years_experience;
        artist.address = profile.address.clone();
        artist.city = profile.city.clone();
        artist.state = profile.state.clone();
        artist.zip = profile.zip.clone();
        artist.phone = profile.phone.clone();
        artist.website = profile.website.clone();
        artist.instagram = profile.instagram.clone();
        Ok(artist.clone())
    }

    async fn update_subscription(&self, change: &TierChange) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.tier_changes.lock().unwrap().push(change.clone());
        if let Some(a) = self
            .artists
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == change.artist_id)
        {
            a.subscription_tier = change.tier;
            a.stripe_subscription_id = change.stripe_subscription_id.clone();
        }
        Ok(())
    }

    async fn artist_analytics(&self, artist_id: i64) -> Result<ArtistAnalytics, sqlx::Error> {
        self.fail_check()?;
        let bookings = self.bookings.lock().unwrap();
        let by_status = |status: BookingStatus| {
            bookings
                .iter()
                .filter(|b| b.artist_id == artist_id && b.status == status)
                .count() as i64
        };
        Ok(ArtistAnalytics {
            total_bookings: bookings.iter().filter(|b| b.artist_id == artist_id).count() as i64,
            pending_bookings: by_status(BookingStatus::Pending),
            confirmed_bookings: by_status(BookingStatus::Confirmed),
            completed_bookings: by_status(BookingStatus::Completed),
            portfolio_images: self
                .images
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.artist_id == artist_id)
                .count() as i64,
            total_reviews: self
                .reviews
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.artist_id == artist_id)
                .count() as i64,
            average_rating: self
                .artists
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == artist_id)
                .and_then(|a| a.average_rating),
        })
    }
}

#[async_trait]
impl PortfolioRepository for MockDb {
    async fn list_images_for_artist(
        &self,
        artist_id: i64,
    ) -> Result<Vec<PortfolioImage>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.artist_id == artist_id)
            .cloned()
            .collect())
    }

    async fn count_images_for_artist(&self, artist_id: i64) -> Result<i64, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.artist_id == artist_id)
            .count() as i64)
    }

    async fn add_image(
        &self,
        artist_id: i64,
        image: &NewPortfolioImage,
    ) -> Result<PortfolioImage, sqlx::Error> {
        self.fail_check()?;
        let created = PortfolioImage {
            id: self.alloc_id(),
            artist_id,
            image_url: image.image_url.trim().to_string(),
            storage_key: image.storage_key.clone(),
            caption: image.caption.clone(),
            style: image.style.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.images.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_image(&self, artist_id: i64, image_id: i64) -> Result<bool, sqlx::Error> {
        self.fail_check()?;
        let mut guard = self.images.lock().unwrap();
        let before = guard.len();
        guard.retain(|i| !(i.id == image_id && i.artist_id == artist_id));
        Ok(guard.len() < before)
    }
}

#[async_trait]
impl ReviewRepository for MockDb {
    async fn list_reviews_for_artist(&self, artist_id: i64) -> Result<Vec<Review>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.artist_id == artist_id)
            .cloned()
            .collect())
    }

    async fn find_review_by_id(&self, id: i64) -> Result<Option<Review>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create_review(&self, user_id: i64, review: &NewReview) -> Result<Review, sqlx::Error> {
        self.fail_check()?;
        let created = Review {
            id: self.alloc_id(),
            artist_id: review.artist_id,
            user_id,
            rating: review.rating,
            comment: review.comment.clone(),
            artist_response: None,
            responded_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.reviews.lock().unwrap().push(created.clone());

        let ratings: Vec<i32> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.artist_id == review.artist_id)
            .map(|r| r.rating)
            .collect();
        if let Some(a) = self
            .artists
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == review.artist_id)
        {
            a.total_reviews = ratings.len() as i32;
            a.average_rating = Some(ratings.iter().sum::<i32>() as f64 / ratings.len() as f64);
        }
        Ok(created)
    }

    async fn set_response(&self, review_id: i64, response: &str) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        if let Some(r) = self
            .reviews
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.id == review_id)
        {
            r.artist_response = Some(response.to_string());
            r.responded_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_public_user_by_id(
        &self,
        user_id: i64,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| PublicUser {
                id: u.id,
                email: u.email.clone(),
                name: u.name.clone(),
                role: u.role,
            }))
    }

    async fn find_user_email_by_id(&self, user_id: i64) -> Result<Option<String>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.email.clone()))
    }
}

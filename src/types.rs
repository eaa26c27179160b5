//! Wire types for the community platform REST surface.
//!
//! The backend is loose about optional fields and occasionally about casing,
//! so list/detail types derive `Default` and deserialize with
//! `#[serde(default)]`: a partial server response still yields a usable
//! record. Timestamps stay as the wire strings; `crate::dates` guards all
//! parsing and formatting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    // The backend answers either `avatar` or `avatarUrl` depending on endpoint
    #[serde(alias = "avatar", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_banned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<String>,
}

impl User {
    /// Preferred display handle: username, then email local part, then id.
    pub fn display_name(&self) -> &str {
        if let Some(u) = self.username.as_deref() {
            if !u.is_empty() { return u; }
        }
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local,
            _ => &self.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Neighborhood {
    pub id: String,
    pub name: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub member_count: Option<u64>,
    pub event_count: Option<u64>,
    pub listing_count: Option<u64>,
    pub post_count: Option<u64>,
    pub created_at: Option<String>,
}

// ---- Events ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EventCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub event_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<u64>,
    pub current_attendees: Option<u64>,
    pub price: Option<f64>,
    pub is_free: bool,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: EventStatus,
    pub created_by: Option<User>,
    pub neighborhood: Option<Neighborhood>,
    pub neighborhood_id: Option<String>,
    pub registration_count: Option<u64>,
    pub waitlist_count: Option<u64>,
    pub view_count: Option<u64>,
    pub user_registration: Option<EventRegistration>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Waitlist,
    Cancelled,
    Attended,
    NoShow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRegistration {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub user: Option<User>,
    pub status: RegistrationStatus,
    pub notes: Option<String>,
    pub emergency_contact: Option<String>,
    pub waitlist_position: Option<u64>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EventComment {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub user: Option<User>,
    pub content: String,
    pub parent_id: Option<String>,
    pub replies: Option<Vec<EventComment>>,
    pub created_at: Option<String>,
}

// ---- Community posts ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostCategory {
    #[default]
    Service,
    Issue,
    Question,
    Announcement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub images: Option<Vec<String>>,
    pub author: Option<User>,
    pub author_id: Option<String>,
    pub neighborhood: Option<Neighborhood>,
    pub neighborhood_id: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_locked: Option<bool>,
    pub view_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub like_count: Option<u64>,
    pub is_liked: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityComment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub user: Option<User>,
    pub content: String,
    pub parent_id: Option<String>,
    pub replies: Option<Vec<CommunityComment>>,
    pub like_count: Option<u64>,
    pub created_at: Option<String>,
}

// ---- Forum (threads and replies) ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub thread_count: u64,
    pub post_count: u64,
    pub parent_id: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteSummary {
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_vote: Option<VoteKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: String,
    pub category: Option<Category>,
    pub author_id: String,
    pub author: Option<User>,
    pub view_count: u64,
    pub post_count: u64,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub last_post_at: Option<String>,
    pub tags: Option<Vec<String>>,
    pub votes: Option<VoteSummary>,
    pub has_answer: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub id: String,
    pub content: String,
    pub thread_id: String,
    pub author_id: String,
    pub author: Option<User>,
    pub parent_id: Option<String>,
    pub replies: Option<Vec<Post>>,
    pub is_answer: Option<bool>,
    pub votes: Option<VoteSummary>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

// ---- Marketplace ----

// Condition and listing status arrive in both SCREAMING and lowercase
// spellings depending on backend version; they stay strings and are compared
// case-insensitively where it matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub is_free: Option<bool>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub seller: Option<User>,
    pub seller_id: Option<String>,
    pub neighborhood: Option<Neighborhood>,
    pub neighborhood_id: Option<String>,
    pub is_favorited: Option<bool>,
    pub favorite_count: Option<u64>,
    pub view_count: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl MarketplaceListing {
    pub fn is_sold(&self) -> bool {
        self.status.as_deref().map(|s| s.eq_ignore_ascii_case("sold")).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub listing_count: Option<u64>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceRequest {
    pub id: String,
    pub listing_id: String,
    pub listing: Option<MarketplaceListing>,
    pub buyer_id: String,
    pub buyer: Option<User>,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewKind {
    Seller,
    Buyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<ReviewKind>,
    pub rating: f64,
    pub comment: Option<String>,
    pub reviewer_id: String,
    pub reviewer: Option<User>,
    pub reviewee_id: String,
    pub listing_id: Option<String>,
    pub created_at: Option<String>,
}

// ---- Notifications, messages, reports ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub related_id: Option<String>,
    pub related_type: Option<String>,
    pub action_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender: Option<User>,
    pub recipient_id: String,
    pub content: String,
    pub created_at: Option<String>,
    pub read_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<User>,
    pub last_message: Option<Message>,
    pub unread_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_id: String,
    pub reporter_id: Option<String>,
    pub reporter: Option<User>,
    pub reason: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub created_at: Option<String>,
    pub resolved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub author: Option<User>,
    pub relevance_score: Option<f64>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_threads: u64,
    pub total_posts: u64,
    pub total_listings: u64,
    pub total_events: u64,
    pub total_community_posts: u64,
    pub active_users: u64,
    pub new_users_today: u64,
}

// ---- Generic envelopes ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Paginated<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Optional `{success, data, message, error}` wrapper some endpoints use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiEnvelope<T> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Free-form notification/privacy preference maps.
pub type PreferenceMap = HashMap<String, bool>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tolerates_partial_response() {
        let u: User = serde_json::from_str(r#"{"id":"u1","email":"a@b.com"}"#).unwrap();
        assert_eq!(u.role, Role::User);
        assert_eq!(u.display_name(), "a");
    }

    #[test]
    fn user_accepts_avatar_alias() {
        let u: User = serde_json::from_str(
            r#"{"id":"u1","email":"a@b.com","avatar":"http://x/a.png","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(u.avatar_url.as_deref(), Some("http://x/a.png"));
        assert_eq!(u.role, Role::Admin);
    }

    #[test]
    fn listing_status_is_case_insensitive() {
        let mut l = MarketplaceListing::default();
        l.status = Some("SOLD".into());
        assert!(l.is_sold());
        l.status = Some("sold".into());
        assert!(l.is_sold());
        l.status = Some("active".into());
        assert!(!l.is_sold());
    }

    #[test]
    fn event_defaults_fill_missing_fields() {
        let e: Event = serde_json::from_str(r#"{"id":"e1","title":"Cleanup","description":"d"}"#).unwrap();
        assert_eq!(e.status, EventStatus::Upcoming);
        assert!(!e.is_free);
        assert!(e.user_registration.is_none());
    }
}

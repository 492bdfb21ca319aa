//! Integration tests for the typed services and their wiring into the stores.

mod common;

use client_lib::error::ClientError;
use client_lib::services::{Credentials, NewComment, NovelDraft, NovelQuery};
use common::{harness, respond, seed_tokens, stored, ScriptedTransport};
use novel_reader_core::ports::HttpMethod;
use novel_reader_core::{NovelSummary, ProgressUpdate, ReadingStatus, Role, SessionState, SyncResult};
use serde_json::json;

fn user_json() -> serde_json::Value {
    json!({ "_id": "u1", "username": "nila", "email": "nila@example.com", "role": "user" })
}

#[tokio::test]
async fn login_persists_the_session() {
    let transport = ScriptedTransport::new(|_| {
        respond(
            200,
            json!({ "success": true, "data": { "token": "a1", "refreshToken": "r1", "user": user_json() } }),
        )
    });
    let h = harness(transport.clone());

    let user = h
        .app
        .auth
        .login(&Credentials {
            email: "nila@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.username, "nila");
    assert!(h.app.session.is_authenticated());
    assert!(h.app.session.has_role(Role::Reader));
    assert!(!h.app.session.has_role(Role::Admin));
    assert_eq!(stored(&h.storage, "authToken").as_deref(), Some("a1"));
    assert_eq!(stored(&h.storage, "refreshToken").as_deref(), Some("r1"));
    assert!(stored(&h.storage, "user").is_some());

    let sent = transport.last_to("/auth/login").unwrap();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.bearer, None);
    assert_eq!(sent.body, Some(json!({ "email": "nila@example.com", "password": "secret" })));

    h.app.auth.logout();
    assert_eq!(h.app.session.current(), SessionState::Anonymous);
    assert_eq!(stored(&h.storage, "authToken"), None);
}

#[tokio::test]
async fn restore_session_verifies_the_stored_token() {
    let transport = ScriptedTransport::new(|request| match request.bearer.as_deref() {
        Some("a1") => respond(200, json!({ "success": true, "data": { "user": user_json() } })),
        _ => respond(401, json!({ "message": "Invalid token" })),
    });
    let h = harness(transport.clone());
    seed_tokens(&h.storage, "a1", "r1");

    let state = h.app.restore_session().await;

    assert_eq!(state.user().map(|u| u.username.as_str()), Some("nila"));
    assert_eq!(transport.calls_to("/auth/verify"), 1);
}

#[tokio::test]
async fn list_novels_sends_filters_and_reads_the_cursor() {
    let transport = ScriptedTransport::new(|_| {
        respond(
            200,
            json!({
                "success": true,
                "data": {
                    "novels": [
                        { "_id": "n1", "title": "Ponniyin Selvan", "tamilTitle": "பொன்னியின் செல்வன்", "author": "Kalki" },
                        { "_id": "n2", "title": "Parthiban Kanavu", "author": "Kalki" }
                    ],
                    "nextCursor": "c2"
                }
            }),
        )
    });
    let h = harness(transport.clone());

    let page = h
        .app
        .novels
        .list_novels(&NovelQuery {
            limit: Some(2),
            search: Some("  kalki ".to_string()),
            ..NovelQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].display_title(novel_reader_core::Language::Tamil), "பொன்னியின் செல்வன்");
    assert_eq!(page.next_cursor.as_deref(), Some("c2"));
    assert!(page.has_more);

    let sent = transport.last_to("/novels").unwrap();
    assert_eq!(
        sent.query,
        vec![
            ("limit".to_string(), "2".to_string()),
            ("search".to_string(), "kalki".to_string())
        ]
    );
}

#[tokio::test]
async fn chapters_come_back_in_reading_order() {
    let transport = ScriptedTransport::new(|_| {
        respond(
            200,
            json!({ "data": [
                { "_id": "c3", "title": "Three", "chapterNumber": 3 },
                { "_id": "c1", "title": "One", "chapterNumber": 1 },
                { "_id": "c2", "title": "Two", "chapterNumber": 2 }
            ] }),
        )
    });
    let h = harness(transport);

    let chapters = h.app.novels.list_chapters("n1").await.unwrap();
    let order: Vec<u32> = chapters.iter().map(|c| c.order).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[tokio::test]
async fn like_toggle_tolerates_an_empty_body() {
    let transport = ScriptedTransport::new(|request| match request.method {
        HttpMethod::Post => respond(200, json!({ "success": true, "data": { "likes": 12, "isLiked": true } })),
        _ => Ok(novel_reader_core::ports::HttpResponse {
            status: 204,
            body: String::new(),
        }),
    });
    let h = harness(transport.clone());

    let liked = h.app.novels.like_novel("n1").await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.likes, 12);
    assert_eq!(
        transport.last_to("/novels/like").unwrap().body,
        Some(json!({ "novelId": "n1" }))
    );

    let unliked = h.app.novels.unlike_chapter("c1").await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(transport.calls_to("/chapters/c1/like"), 1);
}

#[tokio::test]
async fn like_toggle_rejects_a_malformed_body() {
    let transport = ScriptedTransport::new(|_| respond(200, json!({ "success": true, "data": "liked" })));
    let h = harness(transport);

    match h.app.novels.like_novel("n1").await {
        Err(ClientError::InvalidResponse(_)) => {}
        other => panic!("expected an invalid response, got {:?}", other),
    }
}

#[tokio::test]
async fn push_progress_sends_the_update_as_json() {
    let transport = ScriptedTransport::new(|_| respond(200, json!({ "success": true })));
    let h = harness(transport.clone());
    seed_tokens(&h.storage, "a1", "r1");

    let update = ProgressUpdate {
        novel_id: "n1".to_string(),
        chapter_id: None,
        chapter_order: 3,
        status: ReadingStatus::Completed,
    };
    h.app.reading.push_progress(&update).await.unwrap();

    let sent = transport.last_to("/reading/progress").unwrap();
    assert_eq!(
        sent.body,
        Some(json!({ "novelId": "n1", "chapterOrder": 3, "status": "completed" }))
    );
}

#[tokio::test]
async fn progress_is_pushed_only_for_signed_in_readers() {
    let transport = ScriptedTransport::new(|_| respond(200, json!({ "success": true })));
    let h = harness(transport.clone());
    let summary = NovelSummary::new("n1", "Ponniyin Selvan", Some("cover.jpg"), "Kalki");

    // Anonymous: local only.
    assert_eq!(h.app.progress.start_reading(&summary).await, SyncResult::Skipped);
    assert_eq!(transport.calls_to("/reading/progress"), 0);

    h.app
        .session
        .sign_in(
            novel_reader_core::SessionTokens {
                access_token: "a1".to_string(),
                refresh_token: Some("r1".to_string()),
            },
            serde_json::from_value(user_json()).unwrap(),
        )
        .unwrap();

    assert_eq!(h.app.progress.update_progress("n1", "c5", Some(5)).await, SyncResult::Synced);
    let sent = transport.last_to("/reading/progress").unwrap();
    assert_eq!(
        sent.body,
        Some(json!({ "novelId": "n1", "chapterId": "c5", "chapterOrder": 5, "status": "ongoing" }))
    );
    assert_eq!(sent.bearer.as_deref(), Some("a1"));

    assert_eq!(h.app.progress.complete_novel(&summary).await, SyncResult::Synced);
    let sent = transport.last_to("/reading/progress").unwrap();
    assert_eq!(sent.body.unwrap()["status"], "completed");
    assert!(h.app.progress.ongoing().is_empty());
    assert_eq!(h.app.progress.completed().len(), 1);
}

#[tokio::test]
async fn sync_failures_keep_local_progress() {
    let transport = ScriptedTransport::new(|_| respond(500, json!({ "message": "Database unavailable" })));
    let h = harness(transport);
    seed_tokens(&h.storage, "a1", "r1");
    h.app
        .session
        .sign_in(
            novel_reader_core::SessionTokens {
                access_token: "a1".to_string(),
                refresh_token: Some("r1".to_string()),
            },
            serde_json::from_value(user_json()).unwrap(),
        )
        .unwrap();

    let summary = NovelSummary::new("n1", "Ponniyin Selvan", None, "Kalki");
    assert!(h.app.progress.start_reading(&summary).await.is_failed());
    assert!(h.app.progress.update_progress("n1", "c2", Some(2)).await.is_failed());

    h.app.progress.reload();
    let record = h.app.progress.record("n1").unwrap();
    assert_eq!(record.last_chapter_order, 2);
    assert_eq!(record.last_chapter_id.as_deref(), Some("c2"));
}

#[tokio::test]
async fn library_refresh_pulls_bookmarks() {
    let transport = ScriptedTransport::new(|request| match request.path.as_str() {
        "/novels/bookmarks" => respond(
            200,
            json!({ "success": true, "data": { "bookmarks": [ { "_id": "n9", "title": "Sivagamiyin Sabatham" } ] } }),
        ),
        _ => respond(200, json!({ "success": true })),
    });
    let h = harness(transport.clone());

    assert_eq!(h.app.progress.refresh_library().await, SyncResult::Skipped);
    assert_eq!(transport.calls_to("/novels/bookmarks"), 0);

    h.app
        .session
        .sign_in(
            novel_reader_core::SessionTokens {
                access_token: "a1".to_string(),
                refresh_token: None,
            },
            serde_json::from_value(user_json()).unwrap(),
        )
        .unwrap();

    assert_eq!(h.app.progress.refresh_library().await, SyncResult::Synced);
    let library = h.app.progress.library();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0].id, "n9");
    assert!(stored(&h.storage, "libraryBookmarks").is_some());

    assert_eq!(h.app.progress.remove_bookmark("n9").await, SyncResult::Synced);
    let sent = transport.last_to("/novels/bookmark").unwrap();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.body, Some(json!({ "novelId": "n9" })));
}

#[tokio::test]
async fn comments_are_listed_and_posted() {
    let transport = ScriptedTransport::new(|request| match request.method {
        HttpMethod::Get => respond(
            200,
            json!({ "success": true, "data": { "comments": [ { "_id": "m1", "content": "அருமை!", "username": "kavin" } ] } }),
        ),
        _ => respond(
            201,
            json!({ "success": true, "data": { "_id": "m2", "content": "Beautiful chapter", "username": "nila" } }),
        ),
    });
    let h = harness(transport.clone());

    let comments = h.app.comments.list_for_chapter("c1").await.unwrap();
    assert_eq!(comments[0].username, "kavin");
    assert_eq!(transport.calls_to("/comments/c1"), 1);

    let posted = h
        .app
        .comments
        .post(&NewComment {
            novel_id: "n1".to_string(),
            chapter_id: "c1".to_string(),
            content: " Beautiful chapter ".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(posted.id, "m2");
    assert_eq!(
        transport.last_to("/comments").unwrap().body,
        Some(json!({ "novelId": "n1", "chapterId": "c1", "content": "Beautiful chapter" }))
    );

    let empty = h
        .app
        .comments
        .post(&NewComment {
            novel_id: "n1".to_string(),
            chapter_id: "c1".to_string(),
            content: "   ".to_string(),
        })
        .await;
    assert!(matches!(empty, Err(ClientError::InvalidInput(_))));
    assert_eq!(transport.calls_to("/comments"), 1);
}

#[tokio::test]
async fn admin_surface_maps_to_admin_endpoints() {
    let transport = ScriptedTransport::new(|request| match request.path.as_str() {
        "/admin/dashboard/stats" => respond(
            200,
            json!({ "success": true, "data": { "totalNovels": 4, "totalChapters": 120, "totalUsers": 37 } }),
        ),
        "/admin/novels" => respond(201, json!({ "success": true, "data": { "_id": "n5", "title": "Kadal Pura" } })),
        _ => respond(200, json!({ "success": true })),
    });
    let h = harness(transport.clone());

    let stats = h.app.admin.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_chapters, 120);
    assert_eq!(stats.total_comments, 0);

    let created = h
        .app
        .admin
        .create_novel(&NovelDraft {
            title: Some("Kadal Pura".to_string()),
            author: Some("Sandilyan".to_string()),
            ..NovelDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, "n5");
    assert_eq!(
        transport.last_to("/admin/novels").unwrap().body,
        Some(json!({ "title": "Kadal Pura", "author": "Sandilyan" }))
    );

    h.app.admin.delete_chapter("c7").await.unwrap();
    assert_eq!(transport.last_to("/admin/chapters/c7").unwrap().method, HttpMethod::Delete);

    let untitled = h.app.admin.create_novel(&NovelDraft::default()).await;
    assert!(matches!(untitled, Err(ClientError::InvalidInput(_))));
}

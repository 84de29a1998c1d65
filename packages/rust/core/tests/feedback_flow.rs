//! End-to-end feedback flows through the template service.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use postcraft_core::{ApplyOutcome, TemplateService};
use postcraft_shared::{IssueTag, PostcraftError, Template, Version};
use postcraft_storage::{MemoryRepository, SqlRepository, TemplateRepository};
use uuid::Uuid;

const BASIC: &str = "# {title}\n{main_content}";
const LENGTH_MARKER: &str = "*Target length: 500-1000 words*";
const CLARITY_MARKER: &str = "## Writing Guidelines";

fn basic(id: &str) -> Template {
    Template::new(
        id,
        format!("Template {id}"),
        "",
        BASIC,
        vec!["title".into(), "main_content".into()],
    )
}

async fn memory_service(ids: &[&str]) -> TemplateService<MemoryRepository> {
    let repo = MemoryRepository::new();
    for id in ids {
        repo.insert(&basic(id)).await.expect("insert");
    }
    TemplateService::new(repo)
}

#[tokio::test]
async fn too_long_and_confusing() {
    let svc = memory_service(&["t1"]).await;
    let before = svc.load("t1").await.unwrap();

    let set = svc
        .analyze_and_propose("t1", "this is too long and confusing")
        .await
        .unwrap();
    assert_eq!(set.analysis.issues, [IssueTag::Length, IssueTag::Clarity]);
    assert_eq!(svc.load("t1").await.unwrap(), before);

    let outcome = svc
        .apply_confirmed("t1", "this is too long and confusing", None)
        .await
        .unwrap();
    let ApplyOutcome::Applied {
        previous_version,
        new_version,
        entry,
    } = outcome
    else {
        panic!("expected applied outcome");
    };
    assert_eq!(previous_version, Version::INITIAL);
    assert_eq!(new_version.to_string(), "1.0.1");
    assert_eq!(entry.version, new_version);

    let after = svc.load("t1").await.unwrap();
    assert!(after.content.starts_with(BASIC));
    assert!(after.content.contains(LENGTH_MARKER));
    assert!(after.content.contains(CLARITY_MARKER));
    assert_eq!(after.version.to_string(), "1.0.1");
    assert_eq!(after.feedback_history.len(), 1);
    assert_eq!(after.feedback_history[0].feedback, "this is too long and confusing");
    assert_eq!(after.feedback_history[0].changes_applied.len(), 2);
}

#[tokio::test]
async fn sequential_confirmations_bump_sequentially() {
    let svc = memory_service(&["t1"]).await;

    for expected in ["1.0.1", "1.0.2"] {
        let outcome = svc.apply_confirmed("t1", "too long", None).await.unwrap();
        match outcome {
            ApplyOutcome::Applied { new_version, .. } => {
                assert_eq!(new_version.to_string(), expected)
            }
            ApplyOutcome::NoChange { .. } => panic!("expected a change"),
        }
    }

    let t = svc.load("t1").await.unwrap();
    assert_eq!(t.version.to_string(), "1.0.2");
    assert_eq!(t.content.matches(LENGTH_MARKER).count(), 1);

    let versions: Vec<String> = t
        .feedback_history
        .iter()
        .map(|e| e.version.to_string())
        .collect();
    assert_eq!(versions, ["1.0.1", "1.0.2"]);
    assert!(t.feedback_history[0].timestamp <= t.feedback_history[1].timestamp);
    // second pass found the marker already in place
    assert!(t.feedback_history[1].patches.is_empty());
}

#[tokio::test]
async fn empty_feedback_reports_error_and_changes_nothing() {
    let svc = memory_service(&["t1"]).await;
    let before = svc.load("t1").await.unwrap();

    let err = svc.apply_confirmed("t1", "", None).await.unwrap_err();
    assert!(matches!(err, PostcraftError::MissingFeedback));
    assert_eq!(err.status(), "error");
    assert!(err.to_string().contains("no feedback"));

    assert_eq!(svc.load("t1").await.unwrap(), before);
}

#[tokio::test]
async fn updates_to_one_template_never_touch_another() {
    let svc = memory_service(&["t1", "t2"]).await;
    let t2_before = svc.load("t2").await.unwrap();

    svc.apply_confirmed("t1", "too long and confusing", None)
        .await
        .unwrap();
    svc.apply_confirmed("t1", "poorly structured, weak intro", None)
        .await
        .unwrap();
    svc.update_feedback_score("t1", 9.0).await.unwrap();

    assert_eq!(svc.load("t2").await.unwrap(), t2_before);
    assert_eq!(svc.load("t1").await.unwrap().version.to_string(), "1.0.2");
}

#[tokio::test]
async fn concurrent_confirmations_are_serialized() {
    let svc = Arc::new(memory_service(&["t1", "t2"]).await);

    let mut handles = Vec::new();
    for i in 0..10 {
        let svc = Arc::clone(&svc);
        let id = if i % 2 == 0 { "t1" } else { "t2" };
        handles.push(tokio::spawn(async move {
            svc.apply_confirmed(id, "too long", None).await
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("apply");
    }

    for id in ["t1", "t2"] {
        let t = svc.load(id).await.unwrap();
        assert_eq!(t.version.to_string(), "1.0.5");
        let versions: BTreeSet<Version> = t.feedback_history.iter().map(|e| e.version).collect();
        assert_eq!(versions.len(), 5, "every apply got its own version");
    }
}

#[tokio::test]
async fn renders_during_updates_are_all_counted() {
    let svc = Arc::new(memory_service(&["t1"]).await);

    let mut handles = Vec::new();
    for i in 0..8 {
        let svc = Arc::clone(&svc);
        handles.push(tokio::spawn(async move {
            if i % 4 == 0 {
                svc.apply_confirmed("t1", "confusing", None).await.map(|_| ())
            } else {
                svc.render("t1", &HashMap::new()).await.map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("operation");
    }

    let t = svc.load("t1").await.unwrap();
    assert_eq!(t.usage_count, 6);
    assert_eq!(t.version.to_string(), "1.0.2");
}

#[tokio::test]
async fn libsql_backed_flow() {
    let path = std::env::temp_dir().join(format!("pc_flow_{}.db", Uuid::now_v7()));
    let repo = SqlRepository::open(&path).await.expect("open db");
    let svc = TemplateService::open(repo, true).await.expect("open service");

    let listed: Vec<String> = svc.list().await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(listed.len(), 3);
    assert!(listed.contains(&"default".to_string()));

    let set = svc
        .analyze_and_propose("default", "the intro is boring and the ending is weak")
        .await
        .unwrap();
    assert_eq!(set.proposals.len(), 2);

    svc.apply_confirmed("default", "the intro is boring and the ending is weak", Some(set.proposals))
        .await
        .unwrap();
    drop(svc);

    // reopen: changes were persisted, defaults are not re-seeded over them
    let repo = SqlRepository::open(&path).await.expect("reopen db");
    let svc = TemplateService::open(repo, true).await.expect("reopen service");
    let t = svc.load("default").await.unwrap();
    assert_eq!(t.version.to_string(), "1.0.1");
    assert!(t.content.contains("*Make this introduction engaging and informative*"));
    assert!(t.content.contains("*Provide a strong conclusion with key takeaways*"));
    assert_eq!(t.feedback_history.len(), 1);

    let rendered = svc
        .render(
            "default",
            &HashMap::from([("title".to_string(), "Hello".to_string())]),
        )
        .await
        .unwrap();
    assert!(rendered.starts_with("# Hello\n"));
    assert!(rendered.contains("{introduction}"));
    assert_eq!(svc.load("default").await.unwrap().usage_count, 1);
}

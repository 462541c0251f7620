//! Integration tests for the tree-consistency engine: upload with
//! implied folders, rename, move, recursive delete, and the invariants
//! tying logical paths, physical paths, and parent pointers together.

mod common;

use common::{ctx, test_drive, upload};
use stratus_core::error::ErrorKind;
use uuid::Uuid;

#[tokio::test]
async fn upload_with_implied_path_creates_folder_chain() {
    let drive = test_drive().await;
    let ctx = ctx();

    let file = drive
        .tree
        .upload(&ctx, upload(None, "a/b/c.txt", "hello"))
        .await
        .unwrap();

    assert_eq!(file.name, "c.txt");
    assert_eq!(file.path, "/a/b/c.txt");
    assert!(!file.is_folder);
    assert!(drive.physical(&file).is_file());

    let roots = drive.tree.list_children(&ctx, None).await.unwrap();
    assert_eq!(roots.len(), 1);
    let a = &roots[0];
    assert!(a.is_folder);
    assert_eq!(a.path, "/a");
    assert!(drive.physical(a).is_dir());

    let under_a = drive.tree.list_children(&ctx, Some(a.id)).await.unwrap();
    assert_eq!(under_a.len(), 1);
    let b = &under_a[0];
    assert_eq!(b.path, "/a/b");
    assert_eq!(b.parent_id, Some(a.id));
    assert_eq!(file.parent_id, Some(b.id));
}

#[tokio::test]
async fn reupload_does_not_duplicate_folders_and_overwrites_in_place() {
    let drive = test_drive().await;
    let ctx = ctx();

    let first = drive
        .tree
        .upload(&ctx, upload(None, "a/b/c.txt", "v1"))
        .await
        .unwrap();
    let second = drive
        .tree
        .upload(&ctx, upload(None, "a/b/c.txt", "version two"))
        .await
        .unwrap();

    // Overwrite, not a new entity.
    assert_eq!(second.id, first.id);
    assert_eq!(second.size_bytes, "version two".len() as i64);

    let roots = drive.tree.list_children(&ctx, None).await.unwrap();
    assert_eq!(roots.len(), 1, "folder 'a' must not be duplicated");

    let content = std::fs::read_to_string(drive.physical(&second)).unwrap();
    assert_eq!(content, "version two");
}

#[tokio::test]
async fn logical_path_is_parent_path_plus_name() {
    let drive = test_drive().await;
    let ctx = ctx();

    drive
        .tree
        .upload(&ctx, upload(None, "x/y/z/deep.txt", "d"))
        .await
        .unwrap();

    // Walk the whole tree and check the invariant on every node.
    let mut stack = vec![(None, "".to_string())];
    let mut seen = 0;
    while let Some((parent_id, parent_path)) = stack.pop() {
        for node in drive.tree.list_children(&ctx, parent_id).await.unwrap() {
            assert_eq!(node.path, format!("{parent_path}/{}", node.name));
            seen += 1;
            if node.is_folder {
                stack.push((Some(node.id), node.path.clone()));
            }
        }
    }
    assert_eq!(seen, 4);
}

#[tokio::test]
async fn move_folder_into_itself_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    let folder = drive.tree.create_folder(&ctx, "f", None).await.unwrap();
    let err = drive
        .tree
        .move_node(&ctx, folder.id, Some(folder.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CyclicMove);
}

#[tokio::test]
async fn move_folder_into_descendant_fails_at_any_depth() {
    let drive = test_drive().await;
    let ctx = ctx();

    let a = drive.tree.create_folder(&ctx, "a", None).await.unwrap();
    let b = drive.tree.create_folder(&ctx, "b", Some(a.id)).await.unwrap();
    let c = drive.tree.create_folder(&ctx, "c", Some(b.id)).await.unwrap();
    let d = drive.tree.create_folder(&ctx, "d", Some(c.id)).await.unwrap();

    for target in [b.id, c.id, d.id] {
        let err = drive
            .tree
            .move_node(&ctx, a.id, Some(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicMove);
    }

    // The failed moves must leave the tree untouched.
    let a_after = drive.tree.get_node(&ctx, a.id).await.unwrap();
    assert_eq!(a_after.path, "/a");
    assert!(a_after.parent_id.is_none());
    assert!(drive.physical(&d).is_dir());
}

#[tokio::test]
async fn move_rewrites_descendant_paths_and_relocates_bytes() {
    let drive = test_drive().await;
    let ctx = ctx();

    let docs = drive.tree.create_folder(&ctx, "docs", None).await.unwrap();
    drive
        .tree
        .upload(&ctx, upload(Some(docs.id), "sub/inner.txt", "body"))
        .await
        .unwrap();
    let dest = drive.tree.create_folder(&ctx, "archive", None).await.unwrap();

    let moved = drive
        .tree
        .move_node(&ctx, docs.id, Some(dest.id))
        .await
        .unwrap();
    assert_eq!(moved.path, "/archive/docs");
    assert_eq!(moved.parent_id, Some(dest.id));

    let sub = drive.tree.list_children(&ctx, Some(moved.id)).await.unwrap();
    assert_eq!(sub[0].path, "/archive/docs/sub");
    let inner = drive.tree.list_children(&ctx, Some(sub[0].id)).await.unwrap();
    assert_eq!(inner[0].path, "/archive/docs/sub/inner.txt");
    assert_eq!(
        inner[0].storage_path,
        format!("{}/archive/docs/sub/inner.txt", ctx.user_id)
    );

    assert!(drive.physical(&inner[0]).is_file());
    assert!(!drive.root.join(format!("{}/docs", ctx.user_id)).exists());
}

#[tokio::test]
async fn move_file_into_non_folder_target_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    let file = drive
        .tree
        .upload(&ctx, upload(None, "a.txt", "a"))
        .await
        .unwrap();
    let other = drive
        .tree
        .upload(&ctx, upload(None, "b.txt", "b"))
        .await
        .unwrap();

    let err = drive
        .tree
        .move_node(&ctx, file.id, Some(other.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTarget);

    let err = drive
        .tree
        .move_node(&ctx, file.id, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTarget);
}

#[tokio::test]
async fn move_onto_occupied_name_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    let folder = drive.tree.create_folder(&ctx, "dest", None).await.unwrap();
    drive
        .tree
        .upload(&ctx, upload(Some(folder.id), "same.txt", "occupied"))
        .await
        .unwrap();
    let loose = drive
        .tree
        .upload(&ctx, upload(None, "same.txt", "mover"))
        .await
        .unwrap();

    let err = drive
        .tree
        .move_node(&ctx, loose.id, Some(folder.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision);
}

#[tokio::test]
async fn rename_updates_logical_and_physical_paths() {
    let drive = test_drive().await;
    let ctx = ctx();

    let docs = drive.tree.create_folder(&ctx, "docs", None).await.unwrap();
    let file = drive
        .tree
        .upload(&ctx, upload(Some(docs.id), "old.txt", "contents"))
        .await
        .unwrap();

    let renamed = drive.tree.rename(&ctx, file.id, "new.txt").await.unwrap();
    assert_eq!(renamed.id, file.id);
    assert_eq!(renamed.path, "/docs/new.txt");
    assert_eq!(
        renamed.storage_path,
        format!("{}/docs/new.txt", ctx.user_id)
    );
    assert!(drive.physical(&renamed).is_file());
    assert!(!drive.physical(&file).exists());
}

#[tokio::test]
async fn rename_to_occupied_sibling_name_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    let a = drive
        .tree
        .upload(&ctx, upload(None, "a.txt", "a"))
        .await
        .unwrap();
    drive
        .tree
        .upload(&ctx, upload(None, "b.txt", "b"))
        .await
        .unwrap();

    let err = drive.tree.rename(&ctx, a.id, "b.txt").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision);

    // Nothing changed, physically or logically.
    let a_after = drive.tree.get_node(&ctx, a.id).await.unwrap();
    assert_eq!(a_after.path, "/a.txt");
    assert!(drive.physical(&a_after).is_file());
}

#[tokio::test]
async fn rename_folder_rewrites_descendant_paths() {
    let drive = test_drive().await;
    let ctx = ctx();

    let docs = drive.tree.create_folder(&ctx, "docs", None).await.unwrap();
    let file = drive
        .tree
        .upload(&ctx, upload(Some(docs.id), "sub/leaf.txt", "leaf"))
        .await
        .unwrap();

    drive.tree.rename(&ctx, docs.id, "papers").await.unwrap();

    let leaf = drive.tree.get_node(&ctx, file.id).await.unwrap();
    assert_eq!(leaf.path, "/papers/sub/leaf.txt");
    assert_eq!(
        leaf.storage_path,
        format!("{}/papers/sub/leaf.txt", ctx.user_id)
    );
    assert!(drive.physical(&leaf).is_file());
}

#[tokio::test]
async fn rename_rejects_separators_and_dotdot() {
    let drive = test_drive().await;
    let ctx = ctx();

    let file = drive
        .tree
        .upload(&ctx, upload(None, "a.txt", "a"))
        .await
        .unwrap();

    for bad in ["x/y", "x\\y", "..", ""] {
        let err = drive.tree.rename(&ctx, file.id, bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "name {bad:?}");
    }
}

#[tokio::test]
async fn delete_folder_removes_subtree_everywhere() {
    let drive = test_drive().await;
    let ctx = ctx();

    let root_folder = drive.tree.create_folder(&ctx, "project", None).await.unwrap();
    drive
        .tree
        .upload(&ctx, upload(Some(root_folder.id), "src/main.txt", "m"))
        .await
        .unwrap();
    drive
        .tree
        .upload(&ctx, upload(Some(root_folder.id), "readme.txt", "r"))
        .await
        .unwrap();

    drive.tree.delete(&ctx, root_folder.id).await.unwrap();

    assert!(drive.tree.list_recent(&ctx).await.unwrap().is_empty());
    assert!(!drive.physical(&root_folder).exists());
}

#[tokio::test]
async fn delete_unknown_id_is_a_noop() {
    let drive = test_drive().await;
    let ctx = ctx();

    drive.tree.delete(&ctx, Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn upload_rejects_empty_and_traversal_names() {
    let drive = test_drive().await;
    let ctx = ctx();

    for bad in ["", "/", "a/../b.txt", "../escape.txt"] {
        let err = drive
            .tree
            .upload(&ctx, upload(None, bad, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "name {bad:?}");
    }
}

#[tokio::test]
async fn upload_into_missing_parent_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    let err = drive
        .tree
        .upload(&ctx, upload(Some(Uuid::new_v4()), "a.txt", "a"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTarget);
}

#[tokio::test]
async fn upload_over_folder_name_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    drive.tree.create_folder(&ctx, "taken", None).await.unwrap();
    let err = drive
        .tree
        .upload(&ctx, upload(None, "taken", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision);
}

#[tokio::test]
async fn ensure_folder_chain_is_idempotent() {
    let drive = test_drive().await;
    let ctx = ctx();

    let first = drive
        .tree
        .ensure_folder_chain(&ctx, None, &["a", "b", "c"])
        .await
        .unwrap();
    let second = drive
        .tree
        .ensure_folder_chain(&ctx, None, &["a", "b", "c"])
        .await
        .unwrap();
    assert_eq!(first, second);

    let roots = drive.tree.list_children(&ctx, None).await.unwrap();
    assert_eq!(roots.len(), 1);
}

#[tokio::test]
async fn create_folder_collision_fails() {
    let drive = test_drive().await;
    let ctx = ctx();

    drive.tree.create_folder(&ctx, "docs", None).await.unwrap();
    let err = drive
        .tree
        .create_folder(&ctx, "docs", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision);
}

#[tokio::test]
async fn owners_are_fully_isolated() {
    let drive = test_drive().await;
    let alice = ctx();
    let mallory = ctx();

    let secret = drive
        .tree
        .upload(&alice, upload(None, "secret.txt", "s"))
        .await
        .unwrap();

    let err = drive.tree.get_node(&mallory, secret.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Delete through the wrong owner is the unknown-id no-op.
    drive.tree.delete(&mallory, secret.id).await.unwrap();
    assert!(drive.tree.get_node(&alice, secret.id).await.is_ok());

    assert!(drive.tree.list_children(&mallory, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn dangling_ancestor_surfaces_as_broken_chain() {
    use stratus_core::traits::NodeStore;

    let drive = test_drive().await;
    let ctx = ctx();

    let a = drive.tree.create_folder(&ctx, "a", None).await.unwrap();
    let b = drive.tree.create_folder(&ctx, "b", Some(a.id)).await.unwrap();
    let leaf = drive
        .tree
        .upload(&ctx, upload(Some(b.id), "leaf.txt", "x"))
        .await
        .unwrap();

    // Corrupt the store behind the engine's back: drop a middle ancestor.
    drive.store.delete(b.id, ctx.user_id).await.unwrap();

    let err = drive
        .tree
        .rename(&ctx, leaf.id, "renamed.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BrokenChain);
}

#[tokio::test]
async fn end_to_end_upload_move_delete() {
    let drive = test_drive().await;
    let ctx = ctx();

    drive.tree.create_folder(&ctx, "docs", None).await.unwrap();
    let report = drive
        .tree
        .upload(&ctx, upload(None, "docs/report.txt", "0123456789"))
        .await
        .unwrap();

    let all = drive.tree.list_recent(&ctx).await.unwrap();
    assert_eq!(all.len(), 2, "folder plus file");
    assert_eq!(report.size_bytes, 10);
    assert!(
        drive
            .root
            .join(format!("{}/docs/report.txt", ctx.user_id))
            .is_file()
    );

    let moved = drive.tree.move_node(&ctx, report.id, None).await.unwrap();
    assert!(moved.parent_id.is_none());
    assert_eq!(moved.path, "/report.txt");
    assert!(
        drive
            .root
            .join(format!("{}/report.txt", ctx.user_id))
            .is_file()
    );

    let docs = drive
        .tree
        .list_children(&ctx, None)
        .await
        .unwrap()
        .into_iter()
        .find(|n| n.is_folder)
        .unwrap();
    drive.tree.delete(&ctx, docs.id).await.unwrap();

    assert!(!drive.root.join(format!("{}/docs", ctx.user_id)).exists());
    let survivor = drive.tree.get_node(&ctx, moved.id).await.unwrap();
    assert_eq!(survivor.path, "/report.txt");
    assert!(drive.physical(&survivor).is_file());
}

use crate::domain::access::CHANGE_PAGE;
use crate::domain::{Page, User, can_edit};

fn editor() -> User {
    User::Authenticated {
        username: "editor".into(),
        is_superuser: false,
        permissions: vec![CHANGE_PAGE.to_string()],
    }
}

fn member() -> User {
    User::Authenticated {
        username: "member".into(),
        is_superuser: false,
        permissions: vec!["view_page".to_string()],
    }
}

fn admin() -> User {
    User::Authenticated {
        username: "admin".into(),
        is_superuser: true,
        permissions: Vec::new(),
    }
}

#[test]
fn test_permission_required_for_regular_pages() {
    let page = Page::new("docs/", "en", "text");

    assert!(can_edit(Some(&page), &editor()));
    assert!(can_edit(Some(&page), &admin()));
    assert!(!can_edit(Some(&page), &member()));
    assert!(!can_edit(Some(&page), &User::Anonymous));
}

#[test]
fn test_community_pages_are_open() {
    let page = Page::new("community/x/", "en", "text");

    assert!(can_edit(Some(&page), &member()));
    assert!(can_edit(Some(&page), &User::Anonymous));
}

// without a page only the permission counts, even on community paths
#[test]
fn test_missing_page_needs_permission() {
    assert!(can_edit(None, &editor()));
    assert!(!can_edit(None, &member()));
    assert!(!can_edit(None, &User::Anonymous));
}

#[test]
fn test_user_helpers() {
    assert!(!User::Anonymous.is_authenticated());
    assert_eq!(User::Anonymous.username(), None);
    assert!(editor().is_authenticated());
    assert_eq!(editor().username(), Some("editor"));
    assert!(!User::Anonymous.has_perm(CHANGE_PAGE));
}

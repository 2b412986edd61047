mod common;

use anyhow::Result;

use referral_runtime::view::{split_stale, MissingReference, Populated};
use referral_runtime::{Job, ObjectId, ReferralError, ReferralStatus, ReferralStore};

use common::fixture;

#[tokio::test]
async fn test_referral_lifecycle_create_accept_delete() -> Result<()> {
    let f = fixture().await;
    let job_id = f.job.id.to_hex();

    let referral = f.manager.create(&f.employer, Some(job_id.as_str())).await?;
    assert_eq!(referral.status, ReferralStatus::Pending);
    assert_eq!(referral.job_seeker, f.seeker.id);
    assert_eq!(referral.employer, f.employer.id);

    let id = referral.id.to_hex();
    let updated = f.manager.update_status(&f.seeker, &id, Some("accepted")).await?;
    assert_eq!(updated.status, ReferralStatus::Accepted);

    let detail = f.manager.get(&f.employer, &id).await?;
    assert_eq!(detail.status, ReferralStatus::Accepted);
    assert_eq!(detail.job.position, "Backend Engineer");
    assert_eq!(detail.job.skills, vec!["rust", "mongodb"]);
    assert_eq!(detail.employer.current_company.as_deref(), Some("Acme"));
    assert_eq!(detail.job_seeker.email, "sam@mail.test");

    f.manager.delete(&f.employer, &id).await?;
    let err = f.manager.get(&f.employer, &id).await.unwrap_err();
    assert!(matches!(err, ReferralError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_second_referral_for_same_job_conflicts() -> Result<()> {
    let f = fixture().await;
    let job_id = f.job.id.to_hex();

    f.manager.create(&f.employer, Some(job_id.as_str())).await?;
    let err = f.manager.create(&f.employer, Some(job_id.as_str())).await.unwrap_err();
    assert!(matches!(err, ReferralError::Conflict(_)));

    // another employer may still refer the same job
    f.manager.create(&f.other_employer, Some(job_id.as_str())).await?;
    assert_eq!(f.store.referral_count().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_create_validates_role_and_job() -> Result<()> {
    let f = fixture().await;

    let err = f.manager.create(&f.seeker, Some(f.job.id.to_hex().as_str())).await.unwrap_err();
    assert!(matches!(err, ReferralError::RoleMismatch(_)));

    for missing in [None, Some(""), Some("   ")] {
        let err = f.manager.create(&f.employer, missing).await.unwrap_err();
        assert!(matches!(err, ReferralError::InvalidArgument(_)));
    }

    let err = f.manager.create(&f.employer, Some("not-an-id")).await.unwrap_err();
    assert!(matches!(err, ReferralError::InvalidArgument(_)));

    let err = f.manager.create(&f.employer, Some(ObjectId::new().to_hex().as_str())).await.unwrap_err();
    assert!(matches!(err, ReferralError::NotFound(_)));

    assert_eq!(f.store.referral_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_only_participants_can_read() -> Result<()> {
    let f = fixture().await;
    let referral = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let id = referral.id.to_hex();

    assert!(f.manager.get(&f.seeker, &id).await.is_ok());
    assert!(f.manager.get(&f.employer, &id).await.is_ok());

    for outsider in [&f.other_employer, &f.other_seeker] {
        let err = f.manager.get(outsider, &id).await.unwrap_err();
        assert!(matches!(err, ReferralError::NotAuthorized(_)));
    }

    let err = f.manager.get(&f.employer, "1234").await.unwrap_err();
    assert!(matches!(err, ReferralError::InvalidArgument(_)));
    let err = f.manager.get(&f.employer, &ObjectId::new().to_hex()).await.unwrap_err();
    assert!(matches!(err, ReferralError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_read_of_referral_with_deleted_party_is_not_found() -> Result<()> {
    let f = fixture().await;
    let referral = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;

    f.store.remove_job(&f.job.id).await;
    let err = f.manager.get(&f.seeker, &referral.id.to_hex()).await.unwrap_err();
    assert!(matches!(err, ReferralError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_only_addressed_seeker_updates_status() -> Result<()> {
    let f = fixture().await;
    let referral = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let id = referral.id.to_hex();

    for other in [&f.employer, &f.other_seeker] {
        let err = f.manager.update_status(other, &id, Some("accepted")).await.unwrap_err();
        assert!(matches!(err, ReferralError::NotAuthorized(_)));
    }

    let stored = f.store.find_referral(&referral.id).await?.expect("referral exists");
    assert_eq!(stored.status, ReferralStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn test_status_update_accepts_exactly_three_values() -> Result<()> {
    let f = fixture().await;
    let referral = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let id = referral.id.to_hex();

    for bad in [None, Some(""), Some("approved"), Some("Rejected")] {
        let err = f.manager.update_status(&f.seeker, &id, bad).await.unwrap_err();
        assert!(matches!(err, ReferralError::InvalidArgument(_)), "{bad:?} should be rejected");
    }

    // any state may move to any other, including back to pending
    for next in ["rejected", "accepted", "pending", "accepted", "rejected", "pending"] {
        let updated = f.manager.update_status(&f.seeker, &id, Some(next)).await?;
        assert_eq!(updated.status.as_str(), next);
    }

    let err = f.manager.update_status(&f.seeker, "zzz", Some("accepted")).await.unwrap_err();
    assert!(matches!(err, ReferralError::InvalidArgument(_)));
    let err = f.manager
        .update_status(&f.seeker, &ObjectId::new().to_hex(), Some("accepted"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_only_sending_employer_deletes() -> Result<()> {
    let f = fixture().await;
    let referral = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let id = referral.id.to_hex();

    for other in [&f.seeker, &f.other_employer] {
        let err = f.manager.delete(other, &id).await.unwrap_err();
        assert!(matches!(err, ReferralError::NotAuthorized(_)));
    }
    assert_eq!(f.store.referral_count().await, 1);

    f.manager.delete(&f.employer, &id).await?;
    assert_eq!(f.store.referral_count().await, 0);

    let err = f.manager.delete(&f.employer, &id).await.unwrap_err();
    assert!(matches!(err, ReferralError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_clear_all_removes_only_own_referrals() -> Result<()> {
    let f = fixture().await;
    f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let second = f.manager.create(&f.other_employer, Some(f.job.id.to_hex().as_str())).await?;
    f.manager.update_status(&f.seeker, &second.id.to_hex(), Some("rejected")).await?;

    let other_job = f.store.insert_job(Job::new(f.other_seeker.id, "Globex", "Analyst")).await;
    f.manager.create(&f.employer, Some(other_job.id.to_hex().as_str())).await?;

    let err = f.manager.clear_all(&f.employer).await.unwrap_err();
    assert!(matches!(err, ReferralError::RoleMismatch(_)));

    let report = f.manager.clear_all(&f.seeker).await?;
    assert_eq!(report.deleted_count, 2);
    assert_eq!(report.user_name, "Sam Seeker");
    assert_eq!(f.store.referral_count().await, 1);

    let report = f.manager.clear_all(&f.seeker).await?;
    assert_eq!(report.deleted_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_listings_are_role_gated_and_newest_first() -> Result<()> {
    let f = fixture().await;
    let second_job = f.store.insert_job(Job::new(f.seeker.id, "Initech", "SRE")).await;

    let first = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let second = f.manager.create(&f.employer, Some(second_job.id.to_hex().as_str())).await?;

    let err = f.manager.list_sent(&f.seeker).await.unwrap_err();
    assert!(matches!(err, ReferralError::RoleMismatch(_)));
    let err = f.manager.list_received(&f.employer).await.unwrap_err();
    assert!(matches!(err, ReferralError::RoleMismatch(_)));

    let (sent, stale) = split_stale(f.manager.list_sent(&f.employer).await?);
    assert_eq!(stale, 0);
    let sent_ids: Vec<_> = sent.iter().map(|r| r.id.clone()).collect();
    assert_eq!(sent_ids.len(), 2);
    assert!(sent_ids.contains(&first.id.to_hex()));
    assert!(sent_ids.contains(&second.id.to_hex()));
    assert!(sent.windows(2).all(|w| w[0].date >= w[1].date));
    assert_eq!(sent[0].job_seeker.name, "Sam Seeker");

    let (received, stale) = split_stale(f.manager.list_received(&f.seeker).await?);
    assert_eq!(stale, 0);
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].employer.linkedin_profile.as_deref(), Some("https://linkedin.com/in/erin"));
    assert_eq!(received[0].employer.years_of_experience, Some(7));

    let (other, _) = split_stale(f.manager.list_received(&f.other_seeker).await?);
    assert!(other.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_listings_mark_entries_with_deleted_references_as_stale() -> Result<()> {
    let f = fixture().await;
    let second_job = f.store.insert_job(Job::new(f.seeker.id, "Initech", "SRE")).await;

    let kept = f.manager.create(&f.employer, Some(f.job.id.to_hex().as_str())).await?;
    let orphaned = f.manager.create(&f.employer, Some(second_job.id.to_hex().as_str())).await?;
    let from_other = f.manager.create(&f.other_employer, Some(f.job.id.to_hex().as_str())).await?;

    f.store.remove_job(&second_job.id).await;
    f.store.remove_user(&f.other_employer.id).await;

    let sent = f.manager.list_sent(&f.employer).await?;
    assert_eq!(sent.len(), 2);
    assert!(sent.contains(&Populated::Stale {
        referral: orphaned.id,
        missing: MissingReference::Job(second_job.id),
    }));
    let (resolved, stale) = split_stale(sent);
    assert_eq!(stale, 1);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, kept.id.to_hex());

    let received = f.manager.list_received(&f.seeker).await?;
    assert_eq!(received.iter().filter(|entry| entry.is_stale()).count(), 2);
    assert!(received.contains(&Populated::Stale {
        referral: from_other.id,
        missing: MissingReference::User(f.other_employer.id),
    }));
    let (resolved, _) = split_stale(received);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, kept.id.to_hex());
    Ok(())
}

#[tokio::test]
async fn test_deleted_actor_is_not_authorized() -> Result<()> {
    let f = fixture().await;
    assert_eq!(f.manager.resolve_actor(&f.employer.id).await?.id, f.employer.id);

    f.store.remove_user(&f.employer.id).await;
    let err = f.manager.resolve_actor(&f.employer.id).await.unwrap_err();
    assert!(matches!(err, ReferralError::NotAuthorized(_)));
    Ok(())
}

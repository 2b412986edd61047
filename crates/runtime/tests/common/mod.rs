#![allow(dead_code)]

use referral_runtime::{Job, MemoryStore, ReferralManager, User, UserRole};

pub struct Fixture {
    pub store: MemoryStore,
    pub manager: ReferralManager<MemoryStore>,
    pub employer: User,
    pub other_employer: User,
    pub seeker: User,
    pub other_seeker: User,
    pub job: Job,
}

pub async fn fixture() -> Fixture {
    let store = MemoryStore::new();

    let mut employer = User::new("Erin Employer", "erin@acme.test", UserRole::Employer);
    employer.current_company = Some("Acme".to_string());
    employer.years_of_experience = Some(7);
    employer.linkedin_profile = Some("https://linkedin.com/in/erin".to_string());
    let employer = store.insert_user(employer).await;
    let other_employer = store
        .insert_user(User::new("Oscar Other", "oscar@globex.test", UserRole::Employer))
        .await;
    let seeker = store
        .insert_user(User::new("Sam Seeker", "sam@mail.test", UserRole::Jobseeker))
        .await;
    let other_seeker = store
        .insert_user(User::new("Tara Taken", "tara@mail.test", UserRole::Jobseeker))
        .await;

    let mut job = Job::new(seeker.id, "Acme", "Backend Engineer");
    job.location = "Remote".to_string();
    job.skills = vec!["rust".to_string(), "mongodb".to_string()];
    let job = store.insert_job(job).await;

    Fixture {
        manager: ReferralManager::new(store.clone()),
        store,
        employer,
        other_employer,
        seeker,
        other_seeker,
        job,
    }
}

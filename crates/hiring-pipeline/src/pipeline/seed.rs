//! Default pipeline layout and a demo roster used by the CLI and `PIPELINE_SEED_DEMO`.

use super::domain::{NewCandidate, PipelineError, Stage, StageId, StageType};
use super::service::PipelineService;

pub const DEFAULT_STAGES: [(&str, StageType); 7] = [
    ("Applied", StageType::Screening),
    ("Phone Screen", StageType::Screening),
    ("Interview", StageType::Interview),
    ("Onsite Interview", StageType::Interview),
    ("Offer Extended", StageType::Decision),
    ("Hired", StageType::Final),
    ("Rejected", StageType::Final),
];

pub const TEAM_MEMBERS: [&str; 5] = [
    "Nagendra Uggirala",
    "Aisha Sharma",
    "Priya Nair",
    "Kavya Iyer",
    "Arjun Patel",
];

struct DemoCandidate {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    position: &'static str,
    location: &'static str,
    /// Stage name and note for each move after the initial stage.
    path: &'static [(&'static str, &'static str)],
}

const DEMO_CANDIDATES: [DemoCandidate; 9] = [
    DemoCandidate {
        name: "Priya Singh",
        email: "priya.singh@email.com",
        phone: "+91 98765 11111",
        position: "Frontend Engineer",
        location: "Pune, India",
        path: &[],
    },
    DemoCandidate {
        name: "Vikram Gupta",
        email: "vikram.gupta@email.com",
        phone: "+91 98765 22222",
        position: "Backend Developer",
        location: "Noida, India",
        path: &[],
    },
    DemoCandidate {
        name: "Sneha Reddy",
        email: "sneha.reddy@email.com",
        phone: "+91 98765 33333",
        position: "Full Stack Developer",
        location: "Hyderabad, India",
        path: &[],
    },
    DemoCandidate {
        name: "Aisha Sharma",
        email: "aisha.sharma@email.com",
        phone: "+91 98765 44444",
        position: "Frontend Engineer",
        location: "Mumbai, India",
        path: &[("Phone Screen", "Scheduled for screening call")],
    },
    DemoCandidate {
        name: "Meera Patel",
        email: "meera.patel@email.com",
        phone: "+91 87654 32109",
        position: "Backend Developer",
        location: "Bangalore, India",
        path: &[
            ("Phone Screen", "Passed screening"),
            ("Onsite Interview", "Interview scheduled"),
        ],
    },
    DemoCandidate {
        name: "Arjun Nair",
        email: "arjun.nair@email.com",
        phone: "+91 98765 55555",
        position: "Senior Frontend Engineer",
        location: "Kochi, India",
        path: &[
            ("Phone Screen", "Excellent technical screening"),
            ("Onsite Interview", "Outstanding performance"),
            ("Offer Extended", "Offer sent"),
        ],
    },
    DemoCandidate {
        name: "Rahul Verma",
        email: "rahul.verma@email.com",
        phone: "+91 98765 66666",
        position: "Full Stack Developer",
        location: "Gurgaon, India",
        path: &[
            ("Phone Screen", "Passed technical screening"),
            ("Onsite Interview", "Excellent coding and cultural fit"),
            ("Offer Extended", "Offer accepted immediately"),
            ("Hired", "Onboarding completed"),
        ],
    },
    DemoCandidate {
        name: "Ananya Das",
        email: "ananya.das@email.com",
        phone: "+91 98765 77777",
        position: "UI/UX Designer",
        location: "Kolkata, India",
        path: &[
            ("Phone Screen", "Design discussion went well"),
            ("Onsite Interview", "Portfolio presentation was outstanding"),
            ("Offer Extended", "Offer accepted with negotiations"),
            ("Hired", "Successfully onboarded"),
        ],
    },
    DemoCandidate {
        name: "Ravi Kumar",
        email: "ravi.kumar@email.com",
        phone: "+91 98765 88888",
        position: "Full Stack Developer",
        location: "Delhi, India",
        path: &[
            ("Phone Screen", "Did not meet requirements"),
            ("Rejected", "Insufficient experience in required tech stack"),
        ],
    },
];

/// Append the default seven stages to the service's registry.
pub fn install_default_stages(service: &mut PipelineService) -> Result<Vec<Stage>, PipelineError> {
    DEFAULT_STAGES
        .iter()
        .map(|(name, stage_type)| service.add_stage(name, *stage_type))
        .collect()
}

/// Add the demo roster, walking each candidate along its stage path so timelines look lived-in.
/// Requires the default stages. Notifications raised while seeding are cleared.
pub fn seed_demo_candidates(service: &mut PipelineService) -> Result<usize, PipelineError> {
    let applied = stage_named(service, "Applied")?;

    for (index, demo) in DEMO_CANDIDATES.iter().enumerate() {
        let recruiter = TEAM_MEMBERS[index % TEAM_MEMBERS.len()];
        let mut fields = NewCandidate::new(demo.name, demo.position, recruiter, applied);
        fields.email = Some(demo.email.to_string());
        fields.phone = Some(demo.phone.to_string());
        fields.location = Some(demo.location.to_string());

        let candidate = service.add_candidate(fields)?;
        for (stage_name, note) in demo.path {
            let target = stage_named(service, stage_name)?;
            service.move_candidate_with_note(candidate.id, target, note)?;
        }
    }

    service.clear_notifications();
    Ok(DEMO_CANDIDATES.len())
}

fn stage_named(service: &PipelineService, name: &str) -> Result<StageId, PipelineError> {
    service
        .registry()
        .find_by_name(name)
        .map(|stage| stage.id)
        .ok_or_else(|| PipelineError::StageNameNotFound(name.to_string()))
}

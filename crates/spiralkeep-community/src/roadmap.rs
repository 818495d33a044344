//! Roadmap — pillars, their projects, and milestone progress
//!
//! Pillars and projects are stored under two separate keys. Each key that is
//! missing or unreadable falls back to the built-in mock data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spiralkeep_core::storage::SharedStore;
use spiralkeep_core::Result;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pillar {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub pillar_id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub milestones: Vec<Milestone>,
}

impl Project {
    /// Completion percentage, 0-100.
    pub fn progress(&self) -> f64 {
        if self.status == ProjectStatus::Completed {
            return 100.0;
        }
        if self.milestones.is_empty() {
            return 0.0;
        }
        let done = self.milestones.iter().filter(|m| m.completed).count();
        done as f64 * 100.0 / self.milestones.len() as f64
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSummary {
    pub pillars: usize,
    pub projects: usize,
    pub completed_projects: usize,
    pub milestones: usize,
    pub completed_milestones: usize,
    /// Mean project progress, 0-100.
    pub overall_progress: f64,
}

pub struct Roadmap {
    storage: SharedStore,
    pillars_key: String,
    projects_key: String,
    pillars: Vec<Pillar>,
    projects: Vec<Project>,
}

impl Roadmap {
    pub fn load(storage: SharedStore, pillars_key: &str, projects_key: &str) -> Self {
        let pillars = read_or(&storage, pillars_key, mock_pillars);
        let projects = read_or(&storage, projects_key, mock_projects);
        info!("Roadmap loaded: {} pillars, {} projects", pillars.len(), projects.len());
        Self {
            storage,
            pillars_key: pillars_key.to_string(),
            projects_key: projects_key.to_string(),
            pillars,
            projects,
        }
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn projects_for<'a>(&'a self, pillar_id: &'a str) -> impl Iterator<Item = &'a Project> + 'a {
        self.projects.iter().filter(move |p| p.pillar_id == pillar_id)
    }

    /// Mean progress of a pillar's projects. None for an unknown pillar.
    pub fn pillar_progress(&self, pillar_id: &str) -> Option<f64> {
        self.pillars.iter().find(|p| p.id == pillar_id)?;
        let progress: Vec<f64> = self.projects_for(pillar_id).map(Project::progress).collect();
        if progress.is_empty() {
            return Some(0.0);
        }
        Some(progress.iter().sum::<f64>() / progress.len() as f64)
    }

    pub fn summary(&self) -> RoadmapSummary {
        let milestones = self.projects.iter().map(|p| p.milestones.len()).sum();
        let completed_milestones = self
            .projects
            .iter()
            .flat_map(|p| &p.milestones)
            .filter(|m| m.completed)
            .count();
        let overall_progress = if self.projects.is_empty() {
            0.0
        } else {
            self.projects.iter().map(Project::progress).sum::<f64>() / self.projects.len() as f64
        };
        RoadmapSummary {
            pillars: self.pillars.len(),
            projects: self.projects.len(),
            completed_projects: self
                .projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count(),
            milestones,
            completed_milestones,
            overall_progress,
        }
    }

    /// Add a project under an existing pillar. False for an unknown pillar or a duplicate id.
    pub fn add_project(&mut self, project: Project) -> bool {
        if !self.pillars.iter().any(|p| p.id == project.pillar_id)
            || self.projects.iter().any(|p| p.id == project.id)
        {
            return false;
        }
        self.projects.push(project);
        self.persist_projects();
        true
    }

    /// Mark a milestone done. Completing the last open milestone completes the project.
    pub fn complete_milestone(&mut self, project_id: &str, milestone_id: &str) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) else {
            return false;
        };
        let Some(milestone) = project.milestones.iter_mut().find(|m| m.id == milestone_id) else {
            return false;
        };
        milestone.completed = true;
        project.status = if project.milestones.iter().all(|m| m.completed) {
            ProjectStatus::Completed
        } else {
            ProjectStatus::InProgress
        };
        debug!("Milestone {} of {} completed", milestone_id, project_id);
        self.persist_projects();
        true
    }

    pub fn set_project_status(&mut self, project_id: &str, status: ProjectStatus) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) else {
            return false;
        };
        project.status = status;
        self.persist_projects();
        true
    }

    /// Write both keys.
    pub fn save(&self) -> Result<()> {
        self.storage
            .set(&self.pillars_key, &serde_json::to_string(&self.pillars)?)?;
        self.storage
            .set(&self.projects_key, &serde_json::to_string(&self.projects)?)?;
        Ok(())
    }

    fn persist_projects(&self) {
        let written = serde_json::to_string(&self.projects)
            .map_err(spiralkeep_core::Error::from)
            .and_then(|json| self.storage.set(&self.projects_key, &json));
        if let Err(e) = written {
            warn!("Failed to persist roadmap projects: {}", e);
        }
    }
}

fn read_or<T: DeserializeOwned>(storage: &SharedStore, key: &str, fallback: fn() -> T) -> T {
    match storage.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored {} is unreadable: {} - using built-in data", key, e);
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(e) => {
            warn!("Failed to read {}: {} - using built-in data", key, e);
            fallback()
        }
    }
}

fn pillar(id: &str, name: &str, description: &str, color: &str) -> Pillar {
    Pillar {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        color: color.into(),
    }
}

fn project(id: &str, pillar_id: &str, name: &str, status: ProjectStatus, milestones: &[(&str, bool)]) -> Project {
    Project {
        id: id.into(),
        pillar_id: pillar_id.into(),
        name: name.into(),
        description: String::new(),
        status,
        milestones: milestones
            .iter()
            .enumerate()
            .map(|(i, (title, completed))| Milestone {
                id: format!("{}-m{}", id, i + 1),
                title: (*title).into(),
                completed: *completed,
            })
            .collect(),
    }
}

pub fn mock_pillars() -> Vec<Pillar> {
    vec![
        pillar("community", "Community", "Spaces and rituals that hold people together", "amber"),
        pillar("tooling", "Tooling", "Open tools the community builds and maintains", "teal"),
        pillar("governance", "Governance", "How decisions are proposed and settled", "violet"),
    ]
}

pub fn mock_projects() -> Vec<Project> {
    vec![
        project(
            "gathering-circles",
            "community",
            "Gathering Circles",
            ProjectStatus::InProgress,
            &[("Pilot circle", true), ("Facilitator guide", true), ("Monthly cadence", false)],
        ),
        project(
            "sync-bridge",
            "tooling",
            "Cross-device Sync",
            ProjectStatus::InProgress,
            &[("Export format", true), ("Import validation", false)],
        ),
        project(
            "consensus-charter",
            "governance",
            "Consensus Charter",
            ProjectStatus::Planned,
            &[("Draft charter", false), ("Ratification vote", false)],
        ),
    ]
}

//! Demo data for a fresh database.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::BookmarkDb;
use crate::models::{NewBookmark, Repository, User};

pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x7c1f_52a4_3b6e_4d0a_9e25_8f41_d6b3_a0c9);

struct DemoRepo {
    owner: &'static str,
    name: &'static str,
    note: &'static str,
    homepage_url: &'static str,
    description: &'static str,
    language: &'static str,
    stars_count: i64,
    open_issues_count: i64,
    topics: &'static [&'static str],
    last_commit_at: &'static str,
    github_created_at: &'static str,
    github_updated_at: &'static str,
    created_at: &'static str,
    updated_at: &'static str,
}

const DEMO_REPOS: &[DemoRepo] = &[
    DemoRepo {
        owner: "facebook",
        name: "react",
        note: "Looks like it might become popular one day",
        homepage_url: "https://react.dev",
        description: "The library for web and native user interfaces.",
        language: "JavaScript",
        stars_count: 241234,
        open_issues_count: 1099,
        topics: &["declarative", "frontend", "javascript", "library", "react", "ui"],
        last_commit_at: "2025-12-05T23:21:57Z",
        github_created_at: "2013-05-24T16:15:54Z",
        github_updated_at: "2025-12-06T08:09:33Z",
        created_at: "2025-12-06T08:20:03.515Z",
        updated_at: "2025-12-06T08:20:03.515Z",
    },
    DemoRepo {
        owner: "octokit",
        name: "core.js",
        note: "For an app to search and discover useful repositories",
        homepage_url: "",
        description: "Extendable client for GitHub's REST & GraphQL APIs",
        language: "TypeScript",
        stars_count: 1257,
        open_issues_count: 13,
        topics: &["hacktoberfest", "octokit-js", "plugin"],
        last_commit_at: "2025-12-03T21:53:13Z",
        github_created_at: "2019-08-08T00:26:56Z",
        github_updated_at: "2025-12-06T06:42:07Z",
        created_at: "2025-12-06T08:30:22.130Z",
        updated_at: "2025-12-06T08:30:22.130Z",
    },
    DemoRepo {
        owner: "motdotla",
        name: "dotenv",
        note: "For when AWS SSM isn't practical",
        homepage_url: "https://www.dotenv.org",
        description: "Loads environment variables from .env for nodejs projects.",
        language: "JavaScript",
        stars_count: 20162,
        open_issues_count: 7,
        topics: &[
            "configuration-file",
            "dotenv",
            "env",
            "environment-variables",
            "javascript",
            "node",
            "nodejs",
            "secret-management",
            "secret-manager",
            "secrets",
            "security-tools",
        ],
        last_commit_at: "2025-09-29T23:21:59Z",
        github_created_at: "2013-07-05T18:25:05Z",
        github_updated_at: "2025-12-05T10:49:06Z",
        created_at: "2025-12-06T08:30:52.432Z",
        updated_at: "2025-12-06T08:30:52.432Z",
    },
    DemoRepo {
        owner: "NixOS",
        name: "nixpkgs",
        note: "If this is out of date, it is a big problem for me",
        homepage_url: "",
        description: "Nix Packages collection & NixOS",
        language: "Nix",
        stars_count: 22641,
        open_issues_count: 17612,
        topics: &["hacktoberfest", "linux", "nix", "nixos", "nixpkgs"],
        last_commit_at: "2025-12-06T08:49:39Z",
        github_created_at: "2012-06-04T02:49:46Z",
        github_updated_at: "2025-12-06T08:56:05Z",
        created_at: "2025-12-06T09:04:09.460Z",
        updated_at: "2025-12-06T09:04:09.460Z",
    },
    DemoRepo {
        owner: "netz98",
        name: "n98-magerun",
        note: "People are still running Magento",
        homepage_url: "http://magerun.net/",
        description: "The swiss army knife for Magento developers, sysadmins and devops. The tool provides a huge set of well tested command line commands which save hours of work time. All commands are extendable by a module API.",
        language: "PHP",
        stars_count: 1442,
        open_issues_count: 95,
        topics: &["cli-app", "magento", "php"],
        last_commit_at: "2025-12-01T15:31:22Z",
        github_created_at: "2012-08-01T13:13:14Z",
        github_updated_at: "2025-12-03T15:04:25Z",
        created_at: "2025-12-06T09:11:01.766Z",
        updated_at: "2025-12-06T09:12:28.159Z",
    },
    DemoRepo {
        owner: "basecamp",
        name: "fizzy",
        note: "Curious about this one",
        homepage_url: "https://fizzy.do",
        description: "Kanban as it should be. Not as it has been.",
        language: "Ruby",
        stars_count: 4623,
        open_issues_count: 26,
        topics: &["hotwire", "kanban", "rails", "ruby"],
        last_commit_at: "2025-12-06T04:53:14Z",
        github_created_at: "2024-06-21T15:43:29Z",
        github_updated_at: "2025-12-06T09:12:33Z",
        created_at: "2025-12-06T09:12:54.267Z",
        updated_at: "2025-12-06T09:12:54.267Z",
    },
    DemoRepo {
        owner: "snowfallorg",
        name: "lib",
        note: "Was recommended for me",
        homepage_url: "https://snowfall.org",
        description: "Unified configuration for systems, packages, modules, shells, templates, and more with Nix Flakes.",
        language: "Nix",
        stars_count: 584,
        open_issues_count: 45,
        topics: &[],
        last_commit_at: "2025-01-06T02:28:15Z",
        github_created_at: "2022-09-08T00:07:34Z",
        github_updated_at: "2025-11-30T14:41:48Z",
        created_at: "2025-12-06T09:14:38.817Z",
        updated_at: "2025-12-06T09:14:38.817Z",
    },
];

fn at(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("Bad demo timestamp {:?}", raw))
}

impl DemoRepo {
    fn to_repository(&self) -> Result<Repository> {
        Ok(Repository {
            owner: self.owner.to_string(),
            name: self.name.to_string(),
            full_name: format!("{}/{}", self.owner, self.name),
            html_url: format!("https://github.com/{}/{}", self.owner, self.name),
            homepage_url: Some(self.homepage_url)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            description: Some(self.description.to_string()),
            language: Some(self.language.to_string()),
            stars_count: self.stars_count,
            open_issues_count: self.open_issues_count,
            archived: false,
            topics: self.topics.iter().map(|t| t.to_string()).collect(),
            latest_release: None,
            last_commit_at: Some(at(self.last_commit_at)?),
            health_flags: Vec::new(),
            github_created_at: at(self.github_created_at)?,
            github_updated_at: at(self.github_updated_at)?,
            created_at: at(self.created_at)?,
            updated_at: at(self.updated_at)?,
        })
    }
}

/// Insert the demo user, repositories and bookmarks. Safe to re-run;
/// returns how many bookmarks were new.
pub fn seed(db: &BookmarkDb, user: &User) -> Result<usize> {
    db.ensure_user(user)?;
    let mut created = 0;
    for demo in DEMO_REPOS {
        let repository = demo.to_repository()?;
        db.upsert_repository(&repository)?;
        let bookmark = NewBookmark {
            user_id: user.id,
            owner: repository.owner,
            name: repository.name,
            note: Some(demo.note.to_string()),
        };
        if db.create_bookmark(&bookmark)? {
            created += 1;
        }
    }
    tracing::info!(user_id = %user.id, created, total = DEMO_REPOS.len(), "Seeded demo bookmarks");
    Ok(created)
}

//! A CLI tool for managing candidate approval.
//! This talks to the server's database directly; approval is never possible
//! through the HTTP API.

use clap::{Arg, ArgAction, ArgMatches, Command};

use campus_vote_backend::{
    config::DEFAULT_DB_URI,
    error::Error,
    model::{
        db::{Student, Vote},
        sqlite::{Db, Repo},
    },
};

const PROGRAM_NAME: &str = "candidate-admin";

const ABOUT_TEXT: &str = "Approve, revoke and tally election candidates.

EXIT CODES:
     0: Success.
     1: Error.";

const DB_URI: &str = "DB_URI";
const REGISTRATION_NUMBER: &str = "REGISTRATION_NUMBER";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    let registration_number = Arg::new(REGISTRATION_NUMBER)
        .help("The candidate's registration number")
        .action(ArgAction::Set)
        .required(true);

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(DB_URI)
                .long("db")
                .help("URI of the voting database")
                .action(ArgAction::Set)
                .default_value(DEFAULT_DB_URI),
        )
        .subcommand_required(true)
        .subcommand(Command::new("pending").about("List candidates awaiting approval"))
        .subcommand(
            Command::new("approve")
                .about("Approve a candidate so they can receive votes")
                .arg(registration_number.clone()),
        )
        .subcommand(
            Command::new("revoke")
                .about("Withdraw a candidate's approval")
                .arg(registration_number),
        )
        .subcommand(Command::new("tally").about("Count votes for each approved candidate"))
}

fn describe(candidate: &Student) -> String {
    format!(
        "{} ({}, id {})",
        candidate.full_name, candidate.registration_number, candidate.id
    )
}

/// Run the chosen subcommand, returning the lines to report.
async fn execute(db: &Db, args: &ArgMatches) -> Result<Vec<String>, Error> {
    let students = Repo::<Student>::from_db(db);
    let lines = match args.subcommand() {
        Some(("pending", _)) => {
            let pending = students.pending_candidates().await?;
            if pending.is_empty() {
                vec!["No candidates awaiting approval.".to_string()]
            } else {
                pending.iter().map(describe).collect()
            }
        }
        Some((action @ ("approve" | "revoke"), sub_args)) => {
            // Required argument is guaranteed to be present.
            let number: &String = sub_args.get_one(REGISTRATION_NUMBER).unwrap();
            let approved = action == "approve";
            let candidate = students.set_approved(number, approved).await?;
            vec![format!(
                "{} {}.",
                if approved { "Approved" } else { "Revoked" },
                describe(&candidate)
            )]
        }
        Some(("tally", _)) => {
            let votes = Repo::<Vote>::from_db(db);
            let mut tally = Vec::new();
            for candidate in students.approved_candidates().await? {
                let count = votes.count_for(candidate.id).await?;
                tally.push((candidate, count));
            }
            tally.sort_by(|(_, a), (_, b)| b.cmp(a));
            tally
                .iter()
                .map(|(candidate, count)| {
                    format!(
                        "{}: {count} vote{}",
                        describe(candidate),
                        if *count != 1 { "s" } else { "" }
                    )
                })
                .collect()
        }
        // Subcommand is required.
        _ => unreachable!(),
    };
    Ok(lines)
}

/// Connect, run, report the result, and return the exit code.
async fn run(args: &ArgMatches) -> u8 {
    let uri: &String = args.get_one(DB_URI).unwrap(); // Has a default value.
    let db = match Db::connect(uri).await {
        Ok(db) => db,
        Err(err) => {
            println!("Failed to open database {uri}: {err}");
            return 1;
        }
    };

    let exit_code = match execute(&db, args).await {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            0
        }
        Err(err) => {
            println!("Error: {err}");
            1
        }
    };
    db.close().await;
    exit_code
}

#[rocket::main]
async fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args).await;
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use campus_vote_backend::model::api::auth::StudentRegistration;

    use super::*;

    fn registration(name: &str, number: &str, is_candidate: bool) -> StudentRegistration {
        StudentRegistration {
            full_name: name.to_string(),
            email_or_phone: format!("{number}@example.edu"),
            registration_number: number.to_string(),
            password: "Abcdef1!".to_string(),
            school: String::new(),
            is_candidate,
        }
    }

    async fn populated() -> Db {
        let db = Db::in_memory().await.unwrap();
        let students = Repo::<Student>::from_db(&db);
        for (name, number, is_candidate) in [
            ("Ada Obi", "2021/CS/0001", false),
            ("Bola Eze", "2020/EE/0042", true),
            ("Chidi Okafor", "2019/LAW/0107", true),
        ] {
            students
                .register(registration(name, number, is_candidate))
                .await
                .unwrap();
        }
        db
    }

    async fn exec(db: &Db, command_line: &[&str]) -> Result<Vec<String>, Error> {
        let args = cli().try_get_matches_from(command_line).unwrap();
        execute(db, &args).await
    }

    #[rocket::async_test]
    async fn approval_flow() {
        log4rs_test_utils::test_logging::init_logging_once_for(
            ["campus_vote_backend"],
            None,
            None,
        );
        let db = populated().await;

        assert_eq!(
            exec(&db, &[PROGRAM_NAME, "pending"]).await.unwrap(),
            vec![
                "Bola Eze (2020/EE/0042, id 2)",
                "Chidi Okafor (2019/LAW/0107, id 3)"
            ]
        );

        assert_eq!(
            exec(&db, &[PROGRAM_NAME, "approve", "2020/EE/0042"])
                .await
                .unwrap(),
            vec!["Approved Bola Eze (2020/EE/0042, id 2)."]
        );
        assert_eq!(
            exec(&db, &[PROGRAM_NAME, "pending"]).await.unwrap(),
            vec!["Chidi Okafor (2019/LAW/0107, id 3)"]
        );

        assert_eq!(
            exec(&db, &[PROGRAM_NAME, "revoke", "2020/EE/0042"])
                .await
                .unwrap(),
            vec!["Revoked Bola Eze (2020/EE/0042, id 2)."]
        );
        assert_eq!(exec(&db, &[PROGRAM_NAME, "pending"]).await.unwrap().len(), 2);

        // Plain voters cannot be approved.
        assert!(matches!(
            exec(&db, &[PROGRAM_NAME, "approve", "2021/CS/0001"]).await,
            Err(Error::NotFound(_))
        ));
        db.close().await;
    }

    #[rocket::async_test]
    async fn tally() {
        let db = populated().await;
        exec(&db, &[PROGRAM_NAME, "approve", "2020/EE/0042"])
            .await
            .unwrap();
        exec(&db, &[PROGRAM_NAME, "approve", "2019/LAW/0107"])
            .await
            .unwrap();
        Repo::<Vote>::from_db(&db).cast(1, 3).await.unwrap();

        assert_eq!(
            exec(&db, &[PROGRAM_NAME, "tally"]).await.unwrap(),
            vec![
                "Chidi Okafor (2019/LAW/0107, id 3): 1 vote",
                "Bola Eze (2020/EE/0042, id 2): 0 votes",
            ]
        );
        db.close().await;
    }

    #[test]
    fn correct_cli_usage() {
        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, "tally"])
            .unwrap();
        assert_eq!(args.get_one::<String>(DB_URI).unwrap(), DEFAULT_DB_URI);

        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, "--db", "sqlite://other.db", "approve", "X/1"])
            .unwrap();
        assert_eq!(args.get_one::<String>(DB_URI).unwrap(), "sqlite://other.db");
        let (name, sub_args) = args.subcommand().unwrap();
        assert_eq!(name, "approve");
        assert_eq!(sub_args.get_one::<String>(REGISTRATION_NUMBER).unwrap(), "X/1");
    }

    #[test]
    fn bad_cli_usage() {
        // No subcommand.
        cli().try_get_matches_from([PROGRAM_NAME]).unwrap_err();
        // Missing registration number.
        cli().try_get_matches_from([PROGRAM_NAME, "approve"]).unwrap_err();
        // Unknown subcommand.
        cli().try_get_matches_from([PROGRAM_NAME, "delete", "X/1"]).unwrap_err();
    }
}

use courseware_http::{error_message, types::CourseListParams, CoursewareClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = CoursewareClient::from_env()
        .map_err(anyhow::Error::msg)?
        .with_session_expiry_handler(|login_path: &str| {
            eprintln!("session expired, sign in again at {login_path}");
        });

    match client.courses().list(&CourseListParams::default()).await {
        Ok(list) => {
            for course in list.courses {
                println!("{} — {} ({:?})", course.id, course.title, course.level);
            }
        }
        Err(err) => eprintln!("{}", error_message(&err)),
    }

    Ok(())
}

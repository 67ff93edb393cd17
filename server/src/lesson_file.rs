use system::{Lesson, LessonId};
use tokio::fs;
use tokio::stream::StreamExt;

pub async fn write_lesson_file(lesson: &Lesson) -> Result<(), ()> {
    let file_name = create_file_name(&lesson.id);
    let content = system::serde_json::to_vec(lesson).expect("must succeed");
    fs::write(file_name, content).await.map_err(|err| {
        log::error!("failed to write lesson file {}: {}", lesson.id, err);
    })
}

pub async fn list_lesson_files() -> Vec<LessonId> {
    let mut result = Vec::new();

    let dir = std::env::current_dir().expect("must succeed");
    let mut entries = fs::read_dir(dir).await.expect("must succeed");
    while let Some(entry) = entries.next().await {
        let entry = entry.expect("must succeed");
        let file_name = entry.file_name().into_string().expect("must succeed");
        if file_name.ends_with(".lesson") {
            if let Some(lesson_id) = file_name
                .split(".")
                .take(1)
                .next()
                .and_then(|s| s.parse::<LessonId>().ok())
            {
                result.push(lesson_id);
            }
        }
    }

    result
}

pub async fn get_lesson_file_meta(lesson_id: &LessonId) -> Result<(), ()> {
    let file_name = create_file_name(lesson_id);
    if let Ok(_) = fs::metadata(file_name).await {
        Ok(())
    } else {
        Err(())
    }
}

pub async fn read_lesson_file(lesson_id: &LessonId) -> Result<Lesson, ()> {
    let file_name = create_file_name(lesson_id);
    if let Ok(content) = fs::read(file_name).await {
        system::serde_json::from_slice::<Lesson>(&content).map_err(|err| {
            log::error!("corrupt lesson file {}: {}", lesson_id, err);
        })
    } else {
        Err(())
    }
}

fn create_file_name(lesson_id: &LessonId) -> String {
    format!("{}.lesson", lesson_id.to_string())
}

use system::{
    AnswerValue, Block, BlockKind, GradingDetails, Lesson, LessonPage, LiveCommand, LiveEvent,
    Role, StudentLessonDocument, TeacherMirrorDocument,
};

fn sample_lesson() -> Lesson {
    let mut lesson = Lesson::new("Leçon 1".into());
    let mut first = Block::new(BlockKind::FillInGap, "Capital of France?".into());
    first.answer_key = Some(AnswerValue::Text("Paris".into()));
    let second = Block::new(BlockKind::Text, "Read the dialogue.".into());
    lesson.pages.push(LessonPage {
        blocks: vec![first, second],
    });
    lesson.pages.push(LessonPage {
        blocks: vec![Block::new(BlockKind::MultipleChoice, "Pick one.".into())],
    });
    lesson
}

fn text(s: &str) -> AnswerValue {
    AnswerValue::Text(s.into())
}

fn correct() -> GradingDetails {
    GradingDetails {
        is_correct: Some(true),
        expected: None,
    }
}

/// Relays a student command to the teacher, as the server would.
fn relay(mirror: &mut TeacherMirrorDocument, command: LiveCommand) {
    mirror.handle_live_event(LiveEvent::from_command(command));
}

#[test]
fn it_keeps_the_mirror_converged_with_the_student() {
    let lesson = sample_lesson();
    let block_id = lesson.pages[0].blocks[0].id;
    let other_id = lesson.pages[0].blocks[1].id;

    let mut student = StudentLessonDocument::new(lesson.clone());
    student.connect_started();
    student.transport_connected(false);

    let mut teacher = TeacherMirrorDocument::new(lesson);
    teacher.connect_started();
    teacher.transport_connected(true);

    // Teacher joins; the student answers with a snapshot.
    let outcome = student.handle_live_event(LiveEvent::PeerJoined {
        role: Role::Teacher,
    });
    for command in outcome.outgoing {
        relay(&mut teacher, command);
    }

    // An arbitrary burst of answer/check/reset traffic.
    relay(&mut teacher, student.set_answer(block_id, text("Pariss")).unwrap());
    relay(&mut teacher, student.set_answer(block_id, text("Paris")).unwrap());
    relay(
        &mut teacher,
        student.check(block_id, Some(correct())).unwrap(),
    );
    relay(&mut teacher, student.set_answer(other_id, text("noted")).unwrap());
    relay(&mut teacher, student.reset(other_id).unwrap());
    relay(&mut teacher, student.change_page(1).unwrap());

    assert_eq!(
        teacher.state().answer(&block_id),
        student.state().answer(&block_id)
    );
    assert!(teacher.state().is_checked(&block_id));
    assert_eq!(teacher.state().answer(&other_id), None);
    assert_eq!(teacher.current_page(), student.state().current_page());
}

#[test]
fn it_converges_after_a_teacher_reconnect_within_one_snapshot() {
    let lesson = sample_lesson();
    let block_id = lesson.pages[0].blocks[0].id;

    let mut student = StudentLessonDocument::new(lesson.clone());
    student.connect_started();
    student.transport_connected(true);

    // The teacher drops; the student keeps working unobserved.
    student.handle_live_event(LiveEvent::PeerLeft {
        role: Role::Teacher,
    });
    student.set_answer(block_id, text("Paris")).unwrap();
    student.check(block_id, Some(correct())).unwrap();
    student.change_page(1).unwrap();

    // A fresh mirror stands in for the reconnected teacher.
    let mut teacher = TeacherMirrorDocument::new(lesson);
    teacher.connect_started();
    teacher.transport_connected(true);

    let outcome = student.handle_live_event(LiveEvent::PeerJoined {
        role: Role::Teacher,
    });
    assert_eq!(outcome.outgoing.len(), 1);
    for command in outcome.outgoing {
        relay(&mut teacher, command);
    }

    assert_eq!(teacher.state().answer(&block_id), Some(&text("Paris")));
    assert!(teacher.state().is_checked(&block_id));
    assert_eq!(teacher.state().details(&block_id), Some(&correct()));
    assert_eq!(teacher.current_page(), 1);
}

#[test]
fn it_checks_a_graded_answer_without_teacher_side_recomputation() {
    let lesson = sample_lesson();
    let block_id = lesson.pages[0].blocks[0].id;

    let mut student = StudentLessonDocument::new(lesson.clone());
    student.connect_started();
    student.transport_connected(true);
    let mut teacher = TeacherMirrorDocument::new(lesson);
    teacher.connect_started();
    teacher.transport_connected(true);

    relay(&mut teacher, student.set_answer(block_id, text("Paris")).unwrap());
    // Grading details come from the result store; the mirror just displays
    // whatever arrives.
    relay(
        &mut teacher,
        student.check(block_id, Some(correct())).unwrap(),
    );

    assert!(teacher.state().is_checked(&block_id));
    assert_eq!(teacher.state().details(&block_id), Some(&correct()));
}

#[test]
fn it_survives_wire_round_trips() {
    let lesson = sample_lesson();
    let block_id = lesson.pages[0].blocks[0].id;

    let mut student = StudentLessonDocument::new(lesson.clone());
    student.connect_started();
    student.transport_connected(true);
    let mut teacher = TeacherMirrorDocument::new(lesson);
    teacher.connect_started();
    teacher.transport_connected(true);

    let answer = AnswerValue::Texts(vec!["Pa".into(), "ris".into()]);
    let command = student.set_answer(block_id, answer.clone()).unwrap();
    let frame = system::bincode::serialize(&command).unwrap();
    let command = system::bincode::deserialize::<LiveCommand>(&frame).unwrap();
    relay(&mut teacher, command);

    assert_eq!(teacher.state().answer(&block_id), Some(&answer));
}

use kanban_core::{
    config::StorageBackend,
    domain::{DragItem, DragState, DropTarget, SequentialGenerator},
    storage::{FileStorage, MemoryStorage},
    BoardDraft, CardDraft, ColumnDraft, KanbanConfig, KanbanError, KanbanService, Storage, UserId,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

fn owner() -> UserId {
    UserId::new("user_owner")
}

fn memory_service() -> KanbanService {
    KanbanService::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(SequentialGenerator::new()),
        &KanbanConfig::default(),
    )
}

#[tokio::test]
async fn move_card_between_new_columns() -> anyhow::Result<()> {
    let service = memory_service();
    let mut board = service
        .create_board(BoardDraft::new("Launch", owner()).with_columns(Vec::<String>::new()))
        .await?;

    let todo = board.add_column(ColumnDraft::new("To Do")).id.clone();
    let card = board.add_card(&todo, CardDraft::new("Task 1"))?.id.clone();
    let doing = board.add_column(ColumnDraft::new("Doing")).id.clone();

    board.move_card(&card, &todo, &doing, 0)?;

    let todo_column = board.board().column(&todo).expect("to do column");
    let doing_column = board.board().column(&doing).expect("doing column");
    assert!(todo_column.cards.is_empty());
    assert_eq!(doing_column.cards.len(), 1);
    assert_eq!(doing_column.cards[0].id, card);
    assert_eq!(doing_column.cards[0].position, 0);
    assert_eq!(doing_column.cards[0].column_id, doing);
    assert!(board.board().is_consistent());

    service.save_board(&board).await?;
    let reopened = service.open_board(board.id()).await?;
    assert_eq!(reopened.board(), board.board());
    Ok(())
}

#[tokio::test]
async fn delete_middle_column_renumbers() -> anyhow::Result<()> {
    let service = memory_service();
    let mut board = service
        .create_board(BoardDraft::new("Columns", owner()).with_columns(["A", "B", "C"]))
        .await?;
    let b = board.board().columns[1].id.clone();

    assert!(board.delete_column(&b));

    let columns: Vec<(&str, usize)> = board
        .board()
        .columns
        .iter()
        .map(|c| (c.title.as_str(), c.position))
        .collect();
    assert_eq!(columns, [("A", 0), ("C", 1)]);
    assert!(!board.delete_column(&b));
    Ok(())
}

#[tokio::test]
async fn oversized_card_title_is_rejected() -> anyhow::Result<()> {
    let service = memory_service();
    let mut board = service
        .create_board(BoardDraft::new("Limits", owner()))
        .await?;
    let column = board.board().columns[0].id.clone();
    let before = board.board().clone();

    let err = board
        .add_card(&column, CardDraft::new("x".repeat(101)))
        .unwrap_err();

    assert!(matches!(err, KanbanError::Validation(_)));
    assert_eq!(err.violations(), ["Title must be less than 100 characters"]);
    assert_eq!(board.board(), &before);

    board.add_card(&column, CardDraft::new("x".repeat(100)))?;
    assert_eq!(board.board().columns[0].cards.len(), 1);
    Ok(())
}

#[tokio::test]
async fn drag_and_drop_round_trip_through_file_storage() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = Arc::new(FileStorage::new(temp_dir.path()));
    storage.initialize().await?;
    let service = KanbanService::new(
        storage,
        Arc::new(SequentialGenerator::new()),
        &KanbanConfig::default(),
    );

    let mut board = service
        .create_board(BoardDraft::new("Sprint 12", owner()))
        .await?;
    let ids = board.board().column_ids();
    let (todo, doing, done) = (ids[0].clone(), ids[1].clone(), ids[2].clone());
    for title in ["Design", "Build", "Ship"] {
        board.add_card(&todo, CardDraft::new(title))?;
    }
    let build = board.board().columns[0].cards[1].id.clone();

    let mut drag = DragState::new();
    drag.start_drag(DragItem::Card {
        id: build.clone(),
        source_column_id: todo.clone(),
        source_index: 1,
    });
    drag.handle_drop(
        &mut board,
        DropTarget::Card {
            target_column_id: doing.clone(),
            target_index: 99,
        },
    )?;

    drag.start_drag(DragItem::Column {
        id: done.clone(),
        source_index: 2,
    });
    drag.handle_drop(&mut board, DropTarget::Column { target_index: -3 })?;

    service.save_board(&board).await?;
    let reopened = service.open_board(board.id()).await?;

    assert_eq!(reopened.board().column_ids(), [done, todo.clone(), doing.clone()]);
    let todo_titles: Vec<&str> = reopened
        .board()
        .column(&todo)
        .expect("to do column")
        .cards
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(todo_titles, ["Design", "Ship"]);
    assert_eq!(
        reopened.board().find_card(&build).map(|(column, _)| &column.id),
        Some(&doing)
    );
    assert!(reopened.board().is_consistent());
    assert_eq!(service.recent_boards().await?, [board.id().clone()]);
    Ok(())
}

#[tokio::test]
async fn reorder_is_lenient() -> anyhow::Result<()> {
    let service = memory_service();
    let mut board = service
        .create_board(BoardDraft::new("Reorder", owner()).with_columns(["Only"]))
        .await?;
    let column = board.board().columns[0].id.clone();
    let mut card_ids = Vec::new();
    for title in ["one", "two", "three"] {
        card_ids.push(board.add_card(&column, CardDraft::new(title))?.id.clone());
    }

    let order = [
        card_ids[2].clone(),
        kanban_core::CardId::new("card_unknown"),
        card_ids[0].clone(),
    ];
    assert!(board.reorder_cards_in_column(&column, &order));

    let cards = &board.board().columns[0].cards;
    let titles: Vec<(&str, usize)> = cards.iter().map(|c| (c.title.as_str(), c.position)).collect();
    assert_eq!(titles, [("three", 0), ("one", 1)]);
    assert!(!board.reorder_cards_in_column(&kanban_core::ColumnId::new("col_missing"), &order));
    Ok(())
}

#[tokio::test]
async fn configured_memory_backend_with_latency() -> anyhow::Result<()> {
    let mut config = KanbanConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.latency_ms = 150;

    tokio::time::pause();
    let service = KanbanService::from_config(&config).await?;
    let started = tokio::time::Instant::now();

    let board = service
        .create_board(BoardDraft::new("Slow", owner()))
        .await?;
    service.open_board(board.id()).await?;

    assert!(started.elapsed() >= std::time::Duration::from_millis(300));
    assert_eq!(service.list_boards().await?.len(), 1);
    Ok(())
}

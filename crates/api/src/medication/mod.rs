mod add_medication;
mod delete_all_medications;
mod delete_medication;
mod fetch_medications;
mod restore_reminders;
mod update_medication;

pub use add_medication::add_medication;
pub(crate) use delete_all_medications::{
    DeleteAllMedicationsUseCase, UseCaseErrors as DeleteAllMedicationsErrors,
};
pub use delete_all_medications::delete_all_medications;
pub use delete_medication::delete_medication;
pub use fetch_medications::fetch_medications;
pub use restore_reminders::restore_reminders;
pub use update_medication::update_medication;

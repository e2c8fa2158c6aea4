//! User-facing texts of the collection flow.

use super::entries::LogEntry;
use super::schema::FieldSpec;

/// Reply to `/start`: greeting plus the first field's question.
pub fn start_message(first: &FieldSpec) -> String {
    format!(
        "Seyir Defteri Raporu oluşturma işlemine başlıyoruz.\n\
         Lütfen sırasıyla sorulan bilgileri giriniz.\n\n\
         İlk olarak {}",
        first.prompt
    )
}

/// Sent when the last field is accepted.
pub fn entries_intro(sentinel: &str) -> String {
    format!(
        "Şimdi saat detaylarını ekleyebilirsiniz. Saat ve detay şeklinde yazınız.\n\
         Örnek: 08:30 Güzergah kontrolü yapıldı\n\
         Yeni detay eklemek istemiyorsanız '{sentinel}' yazınız."
    )
}

pub fn entry_recorded(entry: &LogEntry, sentinel: &str) -> String {
    format!(
        "Saat detayı eklendi: {} - {}\n\
         Başka detay eklemek için devam edin veya '{sentinel}' yazınız.",
        entry.timestamp, entry.note
    )
}

pub const RENDERING: &str = "Rapor oluşturuluyor, lütfen bekleyin...";

pub const DELIVERED: &str =
    "Rapor oluşturuldu ve gönderildi. /start ile yeni rapor oluşturabilirsiniz.";

pub fn render_failed(reason: &str) -> String {
    format!("Rapor oluşturulurken hata oluştu: {reason}")
}

pub const CANCELLED: &str = "Rapor iptal edildi. /start ile yeni rapor oluşturabilirsiniz.";

pub const NOTHING_TO_CANCEL: &str = "İptal edilecek aktif bir rapor yok.";

pub fn help(sentinel: &str) -> String {
    format!(
        "Seyir Defteri botu\n\n\
         /start - yeni rapor başlat\n\
         /iptal - aktif raporu iptal et\n\
         /help - bu mesajı göster\n\n\
         Saat detaylarını bitirmek için '{sentinel}' yazınız."
    )
}

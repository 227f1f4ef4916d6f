//! 화면 포트.
//!
//! 렌더링/레이아웃은 범위 밖이므로 엔진은 이 trait으로만 화면에 요청한다.
//! 구현: `soundnovel-app::console` (터미널 출력)

use crate::models::bookmark::Bookmark;
use crate::models::chapter::ChapterData;
use crate::models::marker::{MarkerId, MarkerKind};
use crate::models::navigation::NavTarget;
use crate::models::settings::Typography;

/// 리더 화면 인터페이스
pub trait ViewSurface: Send + Sync {
    /// 배경 이미지 전환
    fn set_background(&self, src: &str);

    /// 챕터 컨테이너 내용 교체 (아직 숨김 상태)
    fn set_content(&self, chapter_id: u32, title: &str, markup: &str);

    /// 챕터 컨테이너 표시
    fn reveal_content(&self);

    /// 이전/다음 버튼 대상 갱신
    fn set_nav_targets(&self, back: NavTarget, next: NavTarget);

    /// 토글 마커(효과음 버튼, 강조 문구)의 활성 표시
    fn set_control_active(&self, marker: MarkerId, kind: MarkerKind, active: bool);

    /// 본문 표시 설정 적용
    fn apply_typography(&self, typography: &Typography);

    /// 표지 화면 (북마크 안내 포함)
    fn show_front_page(&self, background: &str, bookmark: Option<&Bookmark>);

    /// 작가 소개 화면
    fn show_about(&self, about: Option<&ChapterData>);

    /// 카탈로그 로드 실패 시 강등 화면
    fn show_degraded(&self, reason: &str);

    /// 짧은 안내 메시지 (예: 북마크 저장 확인)
    fn notify(&self, message: &str);
}

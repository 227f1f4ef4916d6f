//! 내비게이션 포트.
//!
//! 단일 페이지 셸(히스토리 스택)과 다중 페이지 셸(페이지 재로드)이
//! 같은 컨트롤러를 구동할 수 있도록 이동 요청만 추상화한다.
//! 구현: `soundnovel-app::shell`

use crate::models::navigation::Route;

/// 위치 이동 요청 인터페이스
///
/// 구현체는 이동 후 라우터에 위치 변경 알림을 전달해야 한다.
/// 히스토리 앞/뒤 이동도 같은 알림 경로를 사용한다.
pub trait Navigator: Send + Sync {
    fn go(&self, route: Route);
}
